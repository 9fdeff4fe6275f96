//! Infers which HTTP method class an utterance is asking for.

use crate::ingestion::HttpMethod;

const CREATE_WORDS: &[&str] = &["create", "add", "make", "new", "register", "open", "start", "post"];
const UPDATE_WORDS: &[&str] = &["update", "edit", "change", "modify", "patch"];
const DELETE_WORDS: &[&str] = &["delete", "remove", "cancel", "close", "destroy"];
const READ_WORDS: &[&str] = &[
    "find", "list", "get", "show", "fetch", "lookup", "search", "read", "query",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Create,
    Update,
    Delete,
    Read,
    /// No keyword matched; every supported method is acceptable.
    Any,
}

impl Intent {
    /// Classify by keyword membership. Checked create, update, delete, read;
    /// the first class with a matching token wins.
    pub fn infer<S: AsRef<str>>(tokens: &[S]) -> Self {
        let has_any = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_ref()));

        if has_any(CREATE_WORDS) {
            Self::Create
        } else if has_any(UPDATE_WORDS) {
            Self::Update
        } else if has_any(DELETE_WORDS) {
            Self::Delete
        } else if has_any(READ_WORDS) {
            Self::Read
        } else {
            Self::Any
        }
    }

    /// Methods that earn the base intent bonus.
    pub fn desired_methods(&self) -> &'static [HttpMethod] {
        match self {
            Self::Create => &[HttpMethod::Post, HttpMethod::Put],
            Self::Update => &[HttpMethod::Put, HttpMethod::Patch],
            Self::Delete => &[HttpMethod::Delete],
            Self::Read => &[HttpMethod::Get],
            Self::Any => &HttpMethod::ALL,
        }
    }

    /// The single method that earns the additional primary bonus.
    pub fn primary_method(&self) -> HttpMethod {
        match self {
            Self::Create => HttpMethod::Post,
            Self::Update => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
            Self::Read | Self::Any => HttpMethod::Get,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::tokenize::tokenize;

    fn infer(text: &str) -> Intent {
        Intent::infer(&tokenize(text))
    }

    #[test]
    fn test_each_intent_class() {
        assert_eq!(infer("create a new widget"), Intent::Create);
        assert_eq!(infer("please modify my order"), Intent::Update);
        assert_eq!(infer("delete the widget"), Intent::Delete);
        assert_eq!(infer("show me all pets"), Intent::Read);
        assert_eq!(infer("widgets please"), Intent::Any);
    }

    #[test]
    fn test_priority_order_create_first() {
        assert_eq!(infer("delete the old one and add a new one"), Intent::Create);
        assert_eq!(infer("find and remove duplicates"), Intent::Delete);
        assert_eq!(infer("update then list"), Intent::Update);
    }

    #[test]
    fn test_keywords_match_whole_tokens_only() {
        assert_eq!(infer("addresses"), Intent::Any);
        assert_eq!(infer("getaway plans"), Intent::Any);
    }

    #[test]
    fn test_methods_per_intent() {
        assert_eq!(Intent::Create.desired_methods(), &[HttpMethod::Post, HttpMethod::Put]);
        assert_eq!(Intent::Update.primary_method(), HttpMethod::Put);
        assert_eq!(Intent::Any.desired_methods().len(), 5);
        assert_eq!(Intent::Any.primary_method(), HttpMethod::Get);
    }
}
