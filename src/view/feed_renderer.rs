use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::text_utils::format_published;

/// Fragment shown when the backend has no posts at all.
pub const NO_POSTS_HTML: &str =
    r#"<p class="no-posts-message">No one has shared their ink yet. Be the first!</p>"#;

/// Fragment shown when the list fetch fails. This is the whole recovery
/// strategy: no partial list is ever rendered next to it.
pub const FETCH_ERROR_HTML: &str =
    r#"<p class="no-posts-message">Error loading blog posts. Please check the backend connection.</p>"#;

#[derive(ramhorns::Content)]
struct FeedList {
    posts: Vec<PostItem>,
}

#[derive(ramhorns::Content)]
struct PostItem {
    title: String,
    author_name: String,
    author_email: String,
    content: String,
    published: String,
}

pub struct FeedRenderer<'a> {
    pub template: Template<'a>,
}

impl FeedRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<FeedRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing feed list template: {}", e)));
            }
        };

        Ok(FeedRenderer {
            template,
        })
    }

    /// Renders one block per post, in the order given. Every field goes
    /// through escaped interpolation, so markup inside a post shows up as
    /// literal text.
    pub fn render(&self, posts: &[Post]) -> String {
        let mut items = vec![];
        for post in posts {
            items.push(PostItem {
                title: post.title.clone(),
                author_name: post.author_name.clone(),
                author_email: post.author_email.clone(),
                content: post.content.clone(),
                published: format_published(&post.created_at.0),
            });
        }

        self.template.render(&FeedList { posts: items })
    }
}

#[cfg(test)]
mod tests {
    use crate::post::PostDate;
    use crate::text_utils::parse_timestamp;

    use super::*;

    const TEMPLATE_SRC: &str =
        "{{#posts}}TITLE=[{{title}}] AUTHOR=[{{author_name}} ({{author_email}})] CONTENT=[{{content}}] PUBLISHED=[{{published}}]\n{{/posts}}";

    fn post(title: &str, content: &str, created_at: &str) -> Post {
        Post {
            id: None,
            title: title.to_string(),
            content: content.to_string(),
            author_name: "Ana".to_string(),
            author_email: "ana@example.com".to_string(),
            created_at: PostDate(parse_timestamp(created_at).unwrap()),
        }
    }

    #[test]
    fn test_render_feed() {
        let feed_renderer = FeedRenderer::new(TEMPLATE_SRC).unwrap();
        let posts = vec![
            post("Second", "more ink", "2025-06-05T14:31:00+00:00"),
            post("First", "hello", "2025-06-01T08:00:00+00:00"),
        ];
        let res = feed_renderer.render(&posts);
        assert_eq!(res, "TITLE=[Second] AUTHOR=[Ana (ana@example.com)] CONTENT=[more ink] PUBLISHED=[June 5, 2025, 02:31 PM]\n\
                         TITLE=[First] AUTHOR=[Ana (ana@example.com)] CONTENT=[hello] PUBLISHED=[June 1, 2025, 08:00 AM]\n");
    }

    #[test]
    fn test_render_escapes_markup_in_fields() {
        let feed_renderer = FeedRenderer::new(TEMPLATE_SRC).unwrap();
        let posts = vec![post("<script>alert(1)</script>", "a & b", "2025-06-05T14:31:00+00:00")];
        let res = feed_renderer.render(&posts);
        assert!(res.contains("TITLE=[&lt;script&gt;alert(1)&lt;/script&gt;]"));
        assert!(res.contains("CONTENT=[a &amp; b]"));
        assert!(!res.contains("<script>"));
    }

    #[test]
    fn test_render_empty_template_section() {
        let feed_renderer = FeedRenderer::new(TEMPLATE_SRC).unwrap();
        assert_eq!(feed_renderer.render(&[]), "");
    }
}
