pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
  id BIGINT PRIMARY KEY,
  timestamp TEXT NOT NULL,
  service TEXT NOT NULL,
  level TEXT NOT NULL CHECK (level IN ('INFO', 'WARNING', 'ERROR', 'DEBUG', 'CRITICAL')),
  message TEXT NOT NULL
);

CREATE SEQUENCE IF NOT EXISTS logs_id_seq;

CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);
"#;
