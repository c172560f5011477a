use url::Url;

/// What the transport hands back for a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body_len: u64,
    /// Value of the `Location` header, if the response carried one.
    pub location: Option<String>,
}

/// The transport a [`Prober`] sends requests through.
///
/// Implementations are shared by every worker of a run and must be safe to call
/// concurrently. Any transport-level failure (refused connection, timeout, TLS or
/// DNS error, unreadable body) is reported as `None`.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &Url) -> Option<RawResponse>;
}

impl<C: HttpClient + ?Sized> HttpClient for std::sync::Arc<C> {
    fn get(&self, url: &Url) -> Option<RawResponse> {
        (**self).get(url)
    }
}

/// A classified response for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub url: Url,
    pub status: u16,
    pub content_length: u64,
    /// Set only when the final response is a redirect that carried a `Location`.
    pub redirect_location: Option<String>,
}

impl Outcome {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Issues one GET per variant and maps the result into an [`Outcome`].
#[derive(Debug)]
pub struct Prober<'a, C: HttpClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: HttpClient + ?Sized> Prober<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Resolves `variant` against `base` and requests it.
    ///
    /// Resolution follows standard relative-URL rules, so a variant such as
    /// `//host` or `/abs` replaces part of the base. Returns `None` when the
    /// variant does not form a valid URL or the request fails.
    pub fn probe(&self, base: &Url, variant: &str) -> Option<Outcome> {
        let url = match base.join(variant) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("cannot join {variant:?} onto {base}: {e}");
                return None;
            }
        };

        let response = self.client.get(&url)?;
        let redirect_location = if (300..400).contains(&response.status) {
            response.location.filter(|loc| !loc.is_empty())
        } else {
            None
        };

        Some(Outcome {
            url,
            status: response.status,
            content_length: response.body_len,
            redirect_location,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_utils::FakeClient;
    use super::*;

    fn base() -> Url {
        Url::parse("http://x/").unwrap()
    }

    #[test]
    fn probe_maps_response_fields() {
        let client = FakeClient::with_fallback(404).route("http://x/admin", 200, 1234);
        let prober = Prober::new(&client);

        let outcome = prober.probe(&base(), "admin").expect("response expected");
        assert_eq!(outcome.url.as_str(), "http://x/admin");
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.content_length, 1234);
        assert_eq!(outcome.redirect_location, None);
    }

    #[test]
    fn transport_failure_yields_none() {
        let client = FakeClient::with_fallback(404).fail("http://x/slow");
        let prober = Prober::new(&client);
        assert!(prober.probe(&base(), "slow").is_none());
        assert_eq!(client.request_count(), 1);
    }

    #[test]
    fn redirect_location_only_reported_for_3xx() {
        let client = FakeClient::with_fallback(404)
            .redirect("http://x/old", 301, "/new")
            .redirect("http://x/odd", 200, "/ignored");
        let prober = Prober::new(&client);

        let moved = prober.probe(&base(), "old").unwrap();
        assert!(moved.is_redirect());
        assert_eq!(moved.redirect_location.as_deref(), Some("/new"));

        let odd = prober.probe(&base(), "odd").unwrap();
        assert_eq!(odd.redirect_location, None);
    }

    #[test]
    fn empty_location_header_is_not_a_redirect_target() {
        let client = FakeClient::with_fallback(404).redirect("http://x/r", 302, "");
        let prober = Prober::new(&client);
        assert_eq!(prober.probe(&base(), "r").unwrap().redirect_location, None);
    }

    #[test]
    fn join_keeps_bypass_suffixes() {
        let client = FakeClient::with_fallback(404);
        let prober = Prober::new(&client);
        let root = Url::parse("http://x/app/").unwrap();

        assert_eq!(
            prober.probe(&root, "admin/..;/").unwrap().url.as_str(),
            "http://x/app/admin/..;/"
        );
        assert_eq!(
            prober.probe(&root, "admin%2f").unwrap().url.as_str(),
            "http://x/app/admin%2f"
        );
        assert_eq!(
            prober.probe(&root, "admin;/").unwrap().url.as_str(),
            "http://x/app/admin;/"
        );
    }

    #[test]
    fn join_resolves_dot_segments() {
        let client = FakeClient::with_fallback(404);
        let prober = Prober::new(&client);
        let root = Url::parse("http://x/app/").unwrap();

        assert_eq!(
            prober.probe(&root, "admin/.").unwrap().url.as_str(),
            "http://x/app/admin/"
        );
        assert_eq!(
            prober.probe(&root, "admin../").unwrap().url.as_str(),
            "http://x/app/admin../"
        );
    }

    #[test]
    fn scheme_relative_variant_overrides_host() {
        let client = FakeClient::with_fallback(404);
        let prober = Prober::new(&client);

        let outcome = prober.probe(&base(), "//evil.com").unwrap();
        assert_eq!(outcome.url.as_str(), "http://evil.com/");

        let absolute = prober.probe(&Url::parse("http://x/app/").unwrap(), "/root").unwrap();
        assert_eq!(absolute.url.as_str(), "http://x/root");
    }

    #[test]
    fn unjoinable_variant_yields_none_without_request() {
        let client = FakeClient::with_fallback(200);
        let prober = Prober::new(&client);
        assert!(prober.probe(&base(), "http://[::1").is_none());
        assert_eq!(client.request_count(), 0);
    }
}
