use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

impl From<pv_core::domain::value_objects::AuthResponse> for AuthResponse {
    fn from(response: pv_core::domain::value_objects::AuthResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_deserialization() {
        let json = r#"{"email":"alice@example.com","password":"hunter2"}"#;
        let request: LoginRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.email, "alice@example.com");
        assert_eq!(request.password, "hunter2");
    }

    #[test]
    fn test_auth_response_serialization() {
        let response = AuthResponse {
            access_token: "jwt".to_string(),
            refresh_token: "secret".to_string(),
            expires_in: 600,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"expires_in\":600"));
    }
}
