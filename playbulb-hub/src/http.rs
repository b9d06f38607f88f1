pub type HttpResult<E = std::io::Error> = Result<HttpResponse, E>;

pub type HttpResponse =
    hyper::Response<http_body_util::combinators::BoxBody<hyper::body::Bytes, std::io::Error>>;

pub const STRIPE_PATH: &str = "/living/stripe";

pub async fn run_server(
    listener: tokio::net::TcpListener,
    control: playbulb_hub::control::Control,
) -> std::io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tracing::trace!(%addr, "accepted connection");
                tokio::task::spawn(handle_connection(stream, control.clone()));
            }
            Err(e) => {
                tracing::warn!("failed to accept: {e:?}");
                continue;
            }
        }
    }
}

async fn handle_connection(stream: tokio::net::TcpStream, control: playbulb_hub::control::Control) {
    let io = hyper_util::rt::TokioIo::new(stream);

    let builder =
        hyper_util::server::conn::auto::Builder::new(hyper_util::rt::tokio::TokioExecutor::new());
    let conn = builder.serve_connection(
        io,
        hyper::service::service_fn(|r| handle_request(r, control.clone())),
    );

    if let Err(e) = conn.await {
        tracing::debug!("connection error: {e:?}");
    }
}

async fn handle_request(
    r: hyper::Request<hyper::body::Incoming>,
    control: playbulb_hub::control::Control,
) -> HttpResult {
    // `/living/stripe/` is the same route
    let path = r.uri().path().trim_end_matches('/').to_string();
    match path.as_str() {
        STRIPE_PATH => stripe(r, control).await,
        _ => playbulb_hub::not_found!("not found: {}", r.uri().path()),
    }
}

async fn stripe(
    r: hyper::Request<hyper::body::Incoming>,
    control: playbulb_hub::control::Control,
) -> HttpResult {
    if r.method() != hyper::Method::POST {
        return playbulb_hub::method_not_allowed!("{} not allowed, use POST", r.method());
    }

    let body = match http_body_util::BodyExt::collect(r.into_body()).await {
        Ok(body) => Some(body.to_bytes()),
        Err(e) => {
            tracing::debug!("failed to read body: {e}");
            None
        }
    };

    match control.apply(body.as_deref()) {
        Ok(_) => bytes_to_resp(vec![], hyper::StatusCode::OK),
        Err(e) => playbulb_hub::bad_request!("{e}"),
    }
}

pub fn bytes_to_resp(bytes: Vec<u8>, status: hyper::StatusCode) -> HttpResult {
    use http_body_util::BodyExt;

    let is_empty = bytes.is_empty();
    let mut r = hyper::Response::new(
        http_body_util::Full::new(hyper::body::Bytes::from(bytes))
            .map_err(|e| match e {})
            .boxed(),
    );
    *r.status_mut() = status;
    if !is_empty {
        r.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }
    Ok(r)
}

pub fn not_found_(m: String) -> HttpResult {
    bytes_to_resp(m.into_bytes(), hyper::StatusCode::NOT_FOUND)
}

pub fn bad_request_(m: String) -> HttpResult {
    bytes_to_resp(m.into_bytes(), hyper::StatusCode::BAD_REQUEST)
}

pub fn method_not_allowed_(m: String) -> HttpResult {
    bytes_to_resp(m.into_bytes(), hyper::StatusCode::METHOD_NOT_ALLOWED)
}

#[macro_export]
macro_rules! not_found {
    ($($t:tt)*) => {{
        playbulb_hub::http::not_found_(format!($($t)*))
    }};
}

#[macro_export]
macro_rules! bad_request {
    ($($t:tt)*) => {{
        playbulb_hub::http::bad_request_(format!($($t)*))
    }};
}

#[macro_export]
macro_rules! method_not_allowed {
    ($($t:tt)*) => {{
        playbulb_hub::http::method_not_allowed_(format!($($t)*))
    }};
}
