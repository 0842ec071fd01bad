use serde::Serialize;

pub mod contact;

#[derive(Serialize)]
pub struct ApiError<M> {
    pub success: bool,
    pub message: M,
}
