//! Navigation between the form and the status page.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::types::Pid;

/// Characters escaped when a pid becomes a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Index route: the card form.
    Form,
    /// `/{pid}`: the status page of one payment.
    Status(Pid),
    NotFound,
}

impl Route {
    /// Resolve a path. Only `/` and a single `/{pid}` segment are routed; the
    /// segment is percent-decoded.
    pub fn parse(path: &str) -> Route {
        let segment = path.trim().trim_matches('/');
        if segment.is_empty() {
            return Route::Form;
        }
        if segment.contains('/') {
            return Route::NotFound;
        }
        match percent_decode_str(segment).decode_utf8() {
            Ok(pid) => Pid::new(pid).map_or(Route::NotFound, Route::Status),
            Err(_) => Route::NotFound,
        }
    }

    pub fn path(&self) -> Option<String> {
        match self {
            Route::Form => Some("/".to_string()),
            Route::Status(pid) => Some(format!("/{}", utf8_percent_encode(pid.as_str(), SEGMENT))),
            Route::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_the_form() {
        assert_eq!(Route::parse("/"), Route::Form);
        assert_eq!(Route::parse(""), Route::Form);
    }

    #[test]
    fn single_segment_is_a_status_page() {
        let route = Route::parse("/abc123");
        assert_eq!(route, Route::Status(Pid::new("abc123").unwrap()));
        assert_eq!(route.path().as_deref(), Some("/abc123"));
        assert_eq!(Route::parse("/abc123/"), route);
    }

    #[test]
    fn deeper_paths_are_not_routed() {
        assert_eq!(Route::parse("/pay/check/abc"), Route::NotFound);
        assert_eq!(Route::NotFound.path(), None);
    }

    #[test]
    fn awkward_pids_survive_the_path() {
        for raw in ["a/b", " padded ", "50%", "q?x#y"] {
            let route = Route::Status(Pid::new(raw).unwrap());
            let path = route.path().unwrap();
            assert_eq!(path.matches('/').count(), 1, "{path}");
            assert_eq!(Route::parse(&path), route, "{raw}");
        }
        assert_eq!(Route::Status(Pid::new("a/b").unwrap()).path().as_deref(), Some("/a%2Fb"));
    }

    #[test]
    fn undecodable_segment_is_not_routed() {
        assert_eq!(Route::parse("/%FF"), Route::NotFound);
    }
}
