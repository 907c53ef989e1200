/// Tag used when `--tag` is not given.
pub(crate) const DEFAULT_TAG: &str = "default";
pub(crate) const DEFAULT_METHOD: &str = "GET";

pub(crate) fn default_tag() -> String {
    DEFAULT_TAG.to_owned()
}

pub(crate) fn default_method() -> String {
    DEFAULT_METHOD.to_owned()
}
