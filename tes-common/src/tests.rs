#[cfg(test)]
mod client_tests {
    use crate::client::{ClientError, TesClient};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;
    use tes_protocol::CREDENTIAL_REQUEST_WIRE;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn test_socket_path(temp_dir: &TempDir) -> String {
        temp_dir
            .path()
            .join(format!(
                "test_{}.sock",
                COUNTER.fetch_add(1, Ordering::SeqCst)
            ))
            .to_str()
            .unwrap()
            .to_string()
    }

    async fn mock_tes_server(socket_path: String, response: String) {
        let _ = std::fs::remove_file(&socket_path);
        let listener = UnixListener::bind(&socket_path).unwrap();

        if let Ok((mut stream, _)) = listener.accept().await {
            let mut request = vec![0u8; 1024];
            let bytes_read = stream.read(&mut request).await.unwrap();
            assert!(bytes_read > 0);

            stream.write_all(response.as_bytes()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_fetch_full_response() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = test_socket_path(&temp_dir);

        let response = r#"{"AccessKeyId":"AKIA123","SecretAccessKey":"secret","Token":"tok","Expiration":"2024-01-01T00:00:00Z"}"#;
        tokio::spawn(mock_tes_server(socket_path.clone(), response.to_string()));
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let client = TesClient::with_socket_path(&socket_path);
        let credentials = client.fetch_formatted_credentials().await.unwrap();

        assert_eq!(credentials.access_key_id.as_deref(), Some("AKIA123"));
        assert_eq!(credentials.secret_access_key.as_deref(), Some("secret"));
        assert_eq!(credentials.session_token.as_deref(), Some("tok"));
        assert_eq!(
            credentials.expiration.as_deref(),
            Some("2024-01-01T00:00:00Z")
        );
        assert!(credentials.is_complete());
    }

    #[tokio::test]
    async fn test_fetch_empty_object() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = test_socket_path(&temp_dir);

        tokio::spawn(mock_tes_server(socket_path.clone(), "{}".to_string()));
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let client = TesClient::with_socket_path(&socket_path);
        let credentials = client.fetch_formatted_credentials().await.unwrap();

        assert_eq!(credentials.missing_fields().len(), 4);
        assert_eq!(credentials.access_key_id, None);
        assert_eq!(credentials.secret_access_key, None);
        assert_eq!(credentials.session_token, None);
        assert_eq!(credentials.expiration, None);
    }

    #[tokio::test]
    async fn test_connect_failure_when_socket_absent() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("no_such_service.sock");

        let client = TesClient::with_socket_path(&socket_path);
        let err = client.fetch_formatted_credentials().await.unwrap_err();

        assert!(matches!(err, ClientError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_escaped_newline_in_token() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = test_socket_path(&temp_dir);

        let response = r#"{"Token":"abc\ndef"}"#;
        tokio::spawn(mock_tes_server(socket_path.clone(), response.to_string()));
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let client = TesClient::with_socket_path(&socket_path);
        let credentials = client.fetch_formatted_credentials().await.unwrap();

        assert_eq!(credentials.session_token.as_deref(), Some("abc\ndef"));
    }

    #[tokio::test]
    async fn test_empty_response_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = test_socket_path(&temp_dir);

        tokio::spawn(mock_tes_server(socket_path.clone(), String::new()));
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let client = TesClient::with_socket_path(&socket_path);
        let credentials = client.fetch_formatted_credentials().await.unwrap();

        assert_eq!(credentials.missing_fields().len(), 4);
    }

    #[tokio::test]
    async fn test_request_payload_is_byte_exact() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = test_socket_path(&temp_dir);

        let (request_tx, request_rx) = tokio::sync::oneshot::channel();
        let server_path = socket_path.clone();
        tokio::spawn(async move {
            let listener = UnixListener::bind(&server_path).unwrap();
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut request = vec![0u8; 1024];
            let bytes_read = stream.read(&mut request).await.unwrap();
            request.truncate(bytes_read);
            request_tx.send(request).unwrap();

            stream.write_all(b"{}").await.unwrap();
        });
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let client = TesClient::with_socket_path(&socket_path);
        client.fetch_formatted_credentials().await.unwrap();

        let observed = request_rx.await.unwrap();
        assert_eq!(observed, CREDENTIAL_REQUEST_WIRE.as_bytes());
    }

    #[tokio::test]
    async fn test_oversized_response_is_cut_at_bound() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = test_socket_path(&temp_dir);

        // The token's closing quote lands past the read bound, so the token
        // is lost while the field before it still extracts.
        let response = format!(
            r#"{{"AccessKeyId":"AKIA123","Token":"{}"}}"#,
            "x".repeat(5000)
        );
        tokio::spawn(mock_tes_server(socket_path.clone(), response));
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let client = TesClient::with_socket_path(&socket_path);
        let credentials = client.fetch_formatted_credentials().await.unwrap();

        assert_eq!(credentials.access_key_id.as_deref(), Some("AKIA123"));
        assert_eq!(credentials.session_token, None);
    }
}
