use std::collections::HashMap;
use std::string::ToString;

use crate::feed::FormState;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    /// Form state carried across a successful submission: the redirect back
    /// to the feed keeps only the author fields in the query string.
    pub fn author_prefill(&self) -> FormState {
        FormState {
            author_name: self.items.get("authorName").cloned().unwrap_or_default(),
            author_email: self.items.get("authorEmail").cloned().unwrap_or_default(),
            blog_title: String::new(),
            blog_content: String::new(),
        }
    }
}
