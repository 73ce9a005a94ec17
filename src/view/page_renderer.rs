use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::feed::FormState;

#[derive(ramhorns::Content)]
struct Alert {
    message: String,
}

#[derive(ramhorns::Content)]
struct FeedPage<'a> {
    errors: Vec<Alert>,
    author_name: &'a str,
    author_email: &'a str,
    blog_title: &'a str,
    blog_content: &'a str,
    feed: &'a str,
}

/// Renders the whole page: the publish form, the error banner and the feed
/// fragment. The template interpolates `feed` unescaped (it is our own
/// markup, already escaped field by field); everything else goes through
/// escaped interpolation.
pub struct PageRenderer<'a> {
    pub template: Template<'a>,
}

impl PageRenderer<'_> {
    pub fn new(page_tpl_src: &str) -> io::Result<PageRenderer> {
        let template = match Template::new(page_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing feed page template: {}", e)));
            }
        };

        Ok(PageRenderer {
            template,
        })
    }

    pub fn render(&self, feed_html: &str, form: &FormState, errors: Vec<String>) -> String {
        let errors = errors.into_iter().map(|message| Alert { message }).collect();
        self.template.render(&FeedPage {
            errors,
            author_name: form.author_name.as_str(),
            author_email: form.author_email.as_str(),
            blog_title: form.blog_title.as_str(),
            blog_content: form.blog_content.as_str(),
            feed: feed_html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE_SRC: &str = "\
{{#errors}}ALERT=[{{message}}] {{/errors}}\
NAME=[{{author_name}}] EMAIL=[{{author_email}}] TITLE=[{{blog_title}}] CONTENT=[{{blog_content}}] FEED=[{{{feed}}}]";

    fn form() -> FormState {
        FormState {
            author_name: "Ana".to_string(),
            author_email: "ana@example.com".to_string(),
            blog_title: String::new(),
            blog_content: String::new(),
        }
    }

    #[test]
    fn test_render_page() {
        let page_renderer = PageRenderer::new(TEMPLATE_SRC).unwrap();
        let res = page_renderer.render("<div>feed</div>", &form(), vec![]);
        assert_eq!(res, "NAME=[Ana] EMAIL=[ana@example.com] TITLE=[] CONTENT=[] FEED=[<div>feed</div>]");
    }

    #[test]
    fn test_render_page_with_error_banner() {
        let page_renderer = PageRenderer::new(TEMPLATE_SRC).unwrap();
        let res = page_renderer.render(
            "",
            &form(),
            vec!["Failed to publish post: Title required".to_string()],
        );
        assert!(res.starts_with("ALERT=[Failed to publish post: Title required] "));
    }

    #[test]
    fn test_render_page_escapes_form_values() {
        let mut form = form();
        form.blog_title = "<b>bold</b>".to_string();
        let page_renderer = PageRenderer::new(TEMPLATE_SRC).unwrap();
        let res = page_renderer.render("", &form, vec![]);
        assert!(res.contains("TITLE=[&lt;b&gt;bold&lt;/b&gt;]"));
    }
}
