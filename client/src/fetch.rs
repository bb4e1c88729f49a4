use fractal_viewer_shared::wire::parse_response;
use fractal_viewer_shared::{DecodedImage, FetchError, FractalRequest};

/// Fetch and decode one tile from the endpoint under the current page path.
pub(crate) async fn fetch_fractal(request: FractalRequest) -> Result<DecodedImage, FetchError> {
    let url = request.url_for_page(&page_href());

    let resp = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(network_error)?;

    check_status(resp.status())?;

    let body = resp.text().await.map_err(network_error)?;
    parse_response(&body)
}

fn page_href() -> String {
    web_sys::window()
        .and_then(|window| window.location().href().ok())
        .unwrap_or_default()
}

fn network_error(e: gloo_net::Error) -> FetchError {
    FetchError::Network(e.to_string())
}

fn check_status(status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Protocol(format!("HTTP {status}")))
    }
}
