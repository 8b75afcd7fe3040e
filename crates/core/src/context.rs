use uuid::Uuid;

/// Identity and correlation data for one authenticated request. Built once at
/// the auth boundary and passed down by value; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub principal: Principal,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub username: String,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            request_id: Uuid::new_v4().simple().to_string(),
        }
    }
}
