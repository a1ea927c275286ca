/// Strips DID parameters, path, query and fragment from a DID URL, keeping
/// only the DID itself.
///
/// ```
/// # use eip712_dids::remove_did_parameters;
/// assert_eq!(remove_did_parameters("did:example:123;service=agent?q=1#key-1"), "did:example:123");
/// ```
pub fn remove_did_parameters(did_url: &str) -> &str {
    match did_url.find(&[';', '/', '?', '#'][..]) {
        Some(end) => &did_url[..end],
        None => did_url,
    }
}
