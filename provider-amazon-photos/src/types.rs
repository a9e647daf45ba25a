//! Amazon Drive API types
//!
//! Wire DTOs for the Amazon Drive v1 nodes and files endpoints. Amazon
//! Photos is a view over Drive: photos are FILE nodes under the account's
//! Photos folder, and albums are FOLDER nodes carrying the ALBUM label.

use serde::{Deserialize, Serialize};

/// A node in Amazon Drive (file or folder)
///
/// See: https://developer.amazon.com/docs/amazon-drive/ad-restful-api-nodes.html
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmazonNode {
    /// Node ID
    pub id: String,

    /// Node name (filename for FILE nodes, folder name otherwise)
    pub name: Option<String>,

    /// Node kind: "FILE" or "FOLDER"
    pub kind: String,

    /// IDs of the node's parent folders
    #[serde(default)]
    pub parents: Vec<String>,

    /// Labels attached to the node ("ALBUM" marks album folders)
    #[serde(default)]
    pub labels: Vec<String>,

    /// Optional node description
    pub description: Option<String>,
}

/// Response from the nodes listing endpoint
///
/// See: https://developer.amazon.com/docs/amazon-drive/ad-restful-api-nodes.html
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesResponse {
    /// Number of nodes matching the filter
    #[serde(default)]
    pub count: u64,

    /// Matching nodes
    #[serde(default)]
    pub data: Vec<AmazonNode>,
}

/// Request body for creating a node (folder or album)
///
/// See: https://developer.amazon.com/docs/amazon-drive/ad-restful-api-nodes.html
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    pub name: String,

    pub kind: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    pub parents: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request body for opening an upload session
///
/// See: https://developer.amazon.com/docs/amazon-drive/ad-restful-api-files.html
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSessionRequest {
    pub content_type: String,

    pub name: String,

    pub parents: Vec<String>,

    pub size: u64,
}

/// Response from opening an upload session
///
/// The returned URL is presigned; the content bytes are PUT there without
/// an Authorization header.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSessionResponse {
    /// Presigned URL to PUT the file bytes to
    pub upload_url: String,

    /// ID of the node the upload creates
    pub id: String,
}
