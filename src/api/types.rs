//! Response payload types for the content-library REST API

use serde::{Deserialize, Serialize};

/// Response from the login exchange
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    /// The bearer token to attach to authenticated calls
    #[serde(rename = "authToken")]
    pub auth_token: String,
}

/// Response from the document-fetch endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    /// Path of the document inside the content library
    #[serde(default)]
    pub document_path: Option<String>,

    /// Raw markup content; absent for empty documents
    #[serde(default)]
    pub content: Option<String>,
}

/// Response from the folder-listing endpoint
#[derive(Debug, Deserialize)]
pub struct FolderListing {
    /// Documents contained in the folder, in backend order
    pub documents: Vec<DocumentEntry>,
}

/// One entry of a folder listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    /// Path of the document inside the content library
    pub document_path: String,
}

/// Response from the table-schema endpoint
#[derive(Debug, Deserialize)]
pub struct TableSchema {
    /// Column definitions of the table
    pub fields: Vec<TableField>,
}

/// One column of a backend table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableField {
    /// Column name
    pub field_name: String,

    /// Column type, e.g. `STR500` or `INTEGER`
    pub field_type: String,
}

/// Response from the table-members endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMembersResponse {
    /// The matched records and their field names
    pub record_data: RecordData,
}

/// Record payload of a members lookup
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordData {
    /// Names of the selected fields
    #[serde(default)]
    pub field_names: Vec<String>,

    /// Matched records; each record lists its field values in
    /// `field_names` order
    #[serde(default)]
    pub records: Vec<Vec<String>>,
}
