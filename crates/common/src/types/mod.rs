use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Uniform error body: `{"error": "..."}`
#[derive(Serialize, Debug)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}
