//! OData response wrappers used by Microsoft Graph

use serde::Deserialize;

/// One page of an OData collection
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    #[serde(rename = "value")]
    pub value: Vec<T>,

    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Error envelope returned by Graph on non-success responses
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
}
