//! Client for the content-library REST API
//!
//! One method per backend endpoint. Methods take the bearer token as an
//! argument; credential lifetime and retry-on-expiry live in the session,
//! not here.

mod http;
mod types;

pub use types::TableField;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use http::HttpClient;
use types::{AuthResponse, DocumentResponse, FolderListing, TableMembersResponse, TableSchema};

/// Credential type sent with the login exchange
const AUTH_TYPE: &str = "password";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    user_name: &'a str,
    password: &'a str,
    auth_type: &'a str,
}

/// Typed client for the content-library REST API
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
}

impl Client {
    /// Create a client for the given service base URL and API root path
    /// segment
    pub fn new(base_url: impl Into<String>, api_root: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(base_url, api_root),
        }
    }

    /// Exchange credentials for a bearer token
    #[instrument(skip(self, password), level = "debug")]
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let request = LoginRequest {
            user_name: username,
            password,
            auth_type: AUTH_TYPE,
        };

        match self.http.post_form::<AuthResponse, _>("auth/token", &request).await {
            Ok(auth) => {
                debug!("Login exchange succeeded");
                Ok(auth.auth_token)
            }
            Err(Error::Api {
                status_code,
                message,
            }) => Err(Error::Auth(format!(
                "login rejected ({}): {}",
                status_code, message
            ))),
            Err(Error::TokenExpired) => Err(Error::Auth("login rejected (401)".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Fetch the raw content of a document by its library path. Returns
    /// `None` when the document exists but carries no content.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn fetch_document(&self, token: &str, path: &str) -> Result<Option<String>> {
        let endpoint = format!("clDocs/{}", path.trim_start_matches('/'));
        let response: DocumentResponse = self.http.get(&endpoint, token).await?;
        Ok(response.content)
    }

    /// List the paths of all documents in a library folder
    #[instrument(skip(self, token), level = "debug")]
    pub async fn list_folder_documents(&self, token: &str, folder: &str) -> Result<Vec<String>> {
        let endpoint = format!("clFolders/{}/items?type=docs", folder);
        let response: FolderListing = self.http.get(&endpoint, token).await?;
        Ok(response
            .documents
            .into_iter()
            .map(|doc| doc.document_path)
            .collect())
    }

    /// Fetch the column definitions of a backend table
    #[instrument(skip(self, token), level = "debug")]
    pub async fn fetch_table_schema(
        &self,
        token: &str,
        folder: &str,
        table: &str,
    ) -> Result<Vec<TableField>> {
        let endpoint = format!("suppData/{}/{}", folder, table);
        let response: TableSchema = self.http.get(&endpoint, token).await?;
        Ok(response.fields)
    }

    /// Fetch one member value from a backend table using a pre-rendered
    /// query string. Returns the first field of the first matched record,
    /// or `None` when nothing matched.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn fetch_table_member(
        &self,
        token: &str,
        table: &str,
        query: &str,
    ) -> Result<Option<String>> {
        let endpoint = format!("suppData/{}/members?{}", table, query);
        let response: TableMembersResponse = self.http.get(&endpoint, token).await?;
        Ok(response
            .record_data
            .records
            .into_iter()
            .next()
            .and_then(|record| record.into_iter().next()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> Client {
        Client::new(server.url(), "rest/api/v1.3")
    }

    #[tokio::test]
    async fn test_login_sends_form_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/v1.3/auth/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user_name".into(), "apiuser".into()),
                Matcher::UrlEncoded("password".into(), "apipass".into()),
                Matcher::UrlEncoded("auth_type".into(), "password".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"authToken": "token"}"#)
            .create_async()
            .await;

        let token = client_for(&server)
            .login("apiuser", "apipass")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(token, "token");
    }

    #[tokio::test]
    async fn test_login_rejection_is_an_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/api/v1.3/auth/token")
            .with_status(403)
            .with_body(r#"{"detail": "bad credentials"}"#)
            .create_async()
            .await;

        let result = client_for(&server).login("apiuser", "wrong").await;

        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_fetch_document_returns_content() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "documentPath": "/contentlibrary/modules/generic.htm",
            "content": "<html></html>"
        });
        let mock = server
            .mock(
                "GET",
                "/rest/api/v1.3/clDocs/contentlibrary/modules/generic.htm",
            )
            .match_header("authorization", "tok")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let content = client_for(&server)
            .fetch_document("tok", "/contentlibrary/modules/generic.htm")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(content.as_deref(), Some("<html></html>"));
    }

    #[tokio::test]
    async fn test_fetch_document_without_content_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/v1.3/clDocs/contentlibrary/modules/empty.htm")
            .with_status(200)
            .with_body(r#"{"documentPath": "/contentlibrary/modules/empty.htm", "content": null}"#)
            .create_async()
            .await;

        let content = client_for(&server)
            .fetch_document("tok", "/contentlibrary/modules/empty.htm")
            .await
            .unwrap();

        assert_eq!(content, None);
    }

    #[tokio::test]
    async fn test_list_folder_documents_collects_paths() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "documents": [
                {"documentPath": "/contentlibrary/modules/generic.htm", "content": null},
                {"documentPath": "/contentlibrary/modules/containing.htm", "content": null}
            ]
        });
        let mock = server
            .mock("GET", "/rest/api/v1.3/clFolders/modules/items?type=docs")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let paths = client_for(&server)
            .list_folder_documents("tok", "modules")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            paths,
            vec![
                "/contentlibrary/modules/generic.htm",
                "/contentlibrary/modules/containing.htm"
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_table_schema_returns_fields() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "fields": [
                {"fieldName": "TITLE", "fieldType": "STR500"},
                {"fieldName": "ID", "fieldType": "INTEGER"}
            ]
        });
        let mock = server
            .mock("GET", "/rest/api/v1.3/suppData/!MasterData/ALL_USERS")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let fields = client_for(&server)
            .fetch_table_schema("tok", "!MasterData", "ALL_USERS")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field_name, "TITLE");
        assert_eq!(fields[1].field_type, "INTEGER");
    }

    #[tokio::test]
    async fn test_fetch_table_member_returns_first_value() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "recordData": {
                "fieldNames": ["TITLE"],
                "records": [["John Doe"]],
                "mapTemplateName": null
            }
        });
        let mock = server
            .mock(
                "GET",
                "/rest/api/v1.3/suppData/ALL_USERS/members?qa=ID&id=1&fs=TITLE",
            )
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let member = client_for(&server)
            .fetch_table_member("tok", "ALL_USERS", "qa=ID&id=1&fs=TITLE")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(member.as_deref(), Some("John Doe"));
    }

    #[tokio::test]
    async fn test_fetch_table_member_with_no_records_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "GET",
                "/rest/api/v1.3/suppData/ALL_USERS/members?qa=ID&id=9&fs=TITLE",
            )
            .with_status(200)
            .with_body(r#"{"recordData": {"fieldNames": [], "records": []}}"#)
            .create_async()
            .await;

        let member = client_for(&server)
            .fetch_table_member("tok", "ALL_USERS", "qa=ID&id=9&fs=TITLE")
            .await
            .unwrap();

        assert_eq!(member, None);
    }
}
