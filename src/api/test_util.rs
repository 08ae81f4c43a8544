use axum::body;
use axum::response::{ErrorResponse, IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Used in tests to both extract the raw bytes from the HTTP response body and then deserialize them into the
/// requested type. Will panic and fail the test if either step fails somehow.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Could not parse body content into data structure! Error: {}, Received body: {:?}",
            err, bytes
        )
    })
}

/// The parts of an error body tests look at
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub error_code: String,
    pub error_description: String,
}

/// Turns a handler's failure into a real response and returns its status and error code
pub async fn error_parts(error: ErrorResponse) -> (u16, String) {
    let response: Response = Err::<(), _>(error).into_response();
    let status = response.status().as_u16();
    let body: ErrorBody = deserialize_body(response.into_body()).await;

    (status, body.error_code)
}
