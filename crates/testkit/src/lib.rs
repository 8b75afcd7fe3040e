use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

/// CSV body with one row that fails timestamp validation.
pub fn sample_csv() -> String {
    [
        "timestamp,service,level,message",
        "2024-01-01 10:00:00.123456,auth,ERROR,boom",
        "bad-ts,auth,INFO,ok",
        "2024-01-01 10:00:01.000000,payments,CRITICAL,fail",
        "",
    ]
    .join("\n")
}

pub fn csv_body(rows: &[(&str, &str, &str, &str)]) -> String {
    let mut out = String::from("timestamp,service,level,message\n");
    for (timestamp, service, level, message) in rows {
        out.push_str(&format!("{timestamp},{service},{level},{message}\n"));
    }
    out
}

/// Mints the bearer token the external login service would issue.
pub fn mint_token(secret: &str, username: &str) -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    let claims = json!({ "id": 1, "username": username, "exp": exp });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign test token")
}
