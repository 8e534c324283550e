use http::HeaderMap;
use http::header::LINK;

/// Extracts the `rel="next"` target from a `Link` response header.
///
/// GitHub formats the header as
/// `<https://api.github.com/...&page=2>; rel="next", <...>; rel="last"`.
pub fn next_page_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let mut parts = link.split(';');
            let target = parts.next()?.trim();
            let is_next = parts.any(|param| {
                let param = param.trim();
                param == "rel=\"next\"" || param == "rel=next"
            });
            if !is_next {
                return None;
            }
            target
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(ToString::to_string)
        })
}
