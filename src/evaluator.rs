// evaluator.rs

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::EvalError;
use crate::token::Operation;

/// The remote service that does the actual arithmetic.
///
/// Futures are `'static` so the event loop can hold one in flight while it
/// keeps handling input.
pub trait Evaluator {
    fn evaluate(&self, expression: String) -> BoxFuture<'static, Result<String, EvalError>>;

    fn evaluate_scientific(
        &self,
        operation: Operation,
        value: f64,
    ) -> BoxFuture<'static, Result<String, EvalError>>;
}

#[derive(Serialize)]
struct CalculateBody {
    expression: String,
}

#[derive(Serialize)]
struct ScientificBody {
    operation: Operation,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl Reply {
    fn into_outcome(self) -> Result<String, EvalError> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(EvalError::Collaborator(error));
        }
        match self.result {
            Some(Value::String(text)) => Ok(text),
            Some(Value::Number(n)) => Ok(if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format_number(n.as_f64().unwrap_or(f64::NAN))
            }),
            Some(other) => Err(EvalError::Transport(format!("unexpected result value {other}"))),
            None => Err(EvalError::Transport("reply carried neither result nor error".into())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Health {
    status: String,
}

/// Print a float the way a browser would: no trailing `.0`, exponent form
/// outside `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        }
    } else {
        value.to_string()
    }
}

/// JSON-over-HTTP evaluator speaking the `/calculate` and `/scientific` API.
#[derive(Clone, Debug)]
pub struct HttpEvaluator {
    client: Client,
    base: Url,
}

impl HttpEvaluator {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, EvalError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base))
    }

    pub fn with_client(client: Client, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { client, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, EvalError> {
        self.base
            .join(path)
            .map_err(|e| EvalError::Transport(format!("bad endpoint {path}: {e}")))
    }

    fn post<B>(&self, path: &str, body: B) -> BoxFuture<'static, Result<String, EvalError>>
    where
        B: Serialize + Send + 'static,
    {
        let client = self.client.clone();
        let url = self.endpoint(path);
        async move {
            let url = url?;
            debug!(%url, "posting to evaluator");
            let response = client.post(url).json(&body).send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            let reply: Reply = serde_json::from_slice(&bytes).map_err(|e| {
                warn!(%status, "undecodable evaluator reply: {e}");
                EvalError::Transport(format!("undecodable reply ({status}): {e}"))
            })?;
            reply.into_outcome()
        }
        .boxed()
    }

    /// Probe `GET /health` and return the reported status.
    pub async fn health(&self) -> Result<String, EvalError> {
        let url = self.endpoint("health")?;
        let health: Health = self
            .client
            .get(url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| EvalError::Transport(format!("undecodable health reply: {e}")))?;
        Ok(health.status)
    }
}

impl Evaluator for HttpEvaluator {
    fn evaluate(&self, expression: String) -> BoxFuture<'static, Result<String, EvalError>> {
        info!(%expression, "calculate");
        self.post("calculate", CalculateBody { expression })
    }

    fn evaluate_scientific(
        &self,
        operation: Operation,
        value: f64,
    ) -> BoxFuture<'static, Result<String, EvalError>> {
        info!(%operation, value, "scientific");
        self.post("scientific", ScientificBody { operation, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn decode(json: &str) -> Result<String, EvalError> {
        serde_json::from_str::<Reply>(json).unwrap().into_outcome()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_reply_decoding() {
        assert_eq!(decode(r#"{"result": 5}"#).unwrap(), "5");
        assert_eq!(decode(r#"{"result": 5.0}"#).unwrap(), "5");
        assert_eq!(decode(r#"{"result": 0.5}"#).unwrap(), "0.5");
        assert_eq!(decode(r#"{"result": "42"}"#).unwrap(), "42");
        assert_eq!(
            decode(r#"{"result": 3628800}"#).unwrap(),
            "3628800"
        );
        match decode(r#"{"error": "Division by zero"}"#) {
            Err(EvalError::Collaborator(msg)) => assert_eq!(msg, "Division by zero"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(decode(r#"{}"#), Err(EvalError::Transport(_))));
        assert!(matches!(decode(r#"{"result": [1]}"#), Err(EvalError::Transport(_))));
    }

    #[test]
    fn test_base_gets_trailing_slash() {
        let evaluator =
            HttpEvaluator::with_client(Client::new(), Url::parse("http://calc.local/api").unwrap());
        assert_eq!(evaluator.endpoint("calculate").unwrap().as_str(), "http://calc.local/api/calculate");
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (Url::parse(&format!("http://{addr}")).unwrap(), handle)
    }

    fn evaluator(base: Url) -> HttpEvaluator {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpEvaluator::with_client(client, base)
    }

    #[tokio::test]
    async fn test_calculate_posts_expression() {
        let (base, server) = serve_once("200 OK", r#"{"result": 5}"#).await;
        let result = evaluator(base).evaluate("2+3".to_string()).await.unwrap();
        assert_eq!(result, "5");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /calculate HTTP/1.1"));
        assert!(request.ends_with(r#"{"expression":"2+3"}"#));
    }

    #[tokio::test]
    async fn test_scientific_posts_operation_and_value() {
        let (base, server) = serve_once("200 OK", r#"{"result": 4.0}"#).await;
        let result = evaluator(base)
            .evaluate_scientific(Operation::Sqrt, 16.0)
            .await
            .unwrap();
        assert_eq!(result, "4");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /scientific HTTP/1.1"));
        assert!(request.ends_with(r#"{"operation":"sqrt","value":16.0}"#));
    }

    #[tokio::test]
    async fn test_error_reply_on_error_status_is_collaborator_error() {
        let (base, _server) = serve_once("404 NOT FOUND", r#"{"error": "Endpoint not found"}"#).await;
        let err = evaluator(base).evaluate("1".to_string()).await.unwrap_err();
        assert_eq!(err.user_message(), "Endpoint not found");
    }

    #[tokio::test]
    async fn test_non_json_reply_is_transport_error() {
        let (base, _server) = serve_once("500 INTERNAL SERVER ERROR", "<html>oops</html>").await;
        let err = evaluator(base).evaluate("1".to_string()).await.unwrap_err();
        assert!(matches!(err, EvalError::Transport(_)));
        assert_eq!(err.user_message(), "Network Error");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let err = evaluator(base).evaluate("1+1".to_string()).await.unwrap_err();
        assert!(matches!(err, EvalError::Transport(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let (base, server) =
            serve_once("200 OK", r#"{"status": "healthy", "service": "calculator"}"#).await;
        assert_eq!(evaluator(base).health().await.unwrap(), "healthy");
        assert!(server.await.unwrap().starts_with("GET /health HTTP/1.1"));
    }
}
