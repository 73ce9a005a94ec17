use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::{fs, io};

use anyhow::Result;
use serde::Deserialize;
use spdlog::{error, info};

use crate::backend_client::BackendClient;
use crate::error::FeedError;
use crate::post::{sort_newest_first, NewPost, Post};
use crate::view::feed_renderer::{FeedRenderer, FETCH_ERROR_HTML, NO_POSTS_HTML};
use crate::view::page_renderer::PageRenderer;

/// Values repopulated into the publish form. After a successful submission
/// only the author fields survive; title and content are cleared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    pub author_name: String,
    pub author_email: String,
    pub blog_title: String,
    pub blog_content: String,
}

/// Urlencoded body of the publish form. Field names match the HTML inputs.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "authorEmail")]
    pub author_email: String,
    #[serde(rename = "blogTitle")]
    pub blog_title: String,
    #[serde(rename = "blogContent")]
    pub blog_content: String,
}

impl PostForm {
    /// All four values, for re-rendering the form after a failed submission.
    pub fn filled(&self) -> FormState {
        FormState {
            author_name: self.author_name.clone(),
            author_email: self.author_email.clone(),
            blog_title: self.blog_title.clone(),
            blog_content: self.blog_content.clone(),
        }
    }

    /// Author fields only. Kept populated across submissions on purpose, so
    /// the same person can post repeatedly without retyping them.
    pub fn cleared(&self) -> FormState {
        FormState {
            author_name: self.author_name.clone(),
            author_email: self.author_email.clone(),
            blog_title: String::new(),
            blog_content: String::new(),
        }
    }

    pub fn into_new_post(self) -> NewPost {
        NewPost {
            author_name: self.author_name,
            author_email: self.author_email,
            title: self.blog_title,
            content: self.blog_content,
        }
    }
}

struct Container {
    seq: u64,
    html: String,
}

/// The one controller of this front-end: fetch, sort, render, submit.
///
/// The container holds the current feed fragment. Every refresh takes a
/// sequence number when it starts; a refresh that finishes after a newer one
/// has already been applied is discarded, so a stale response can never
/// overwrite fresher content.
pub struct FeedController {
    client: BackendClient,
    template_dir: PathBuf,
    issued: AtomicU64,
    container: Mutex<Container>,
}

impl FeedController {
    pub fn new(client: BackendClient, template_dir: PathBuf) -> Self {
        Self {
            client,
            template_dir,
            issued: AtomicU64::new(0),
            container: Mutex::new(Container {
                seq: 0,
                html: NO_POSTS_HTML.to_string(),
            }),
        }
    }

    /// Fetches the collection and rebuilds the feed fragment, fully
    /// replacing the cached one. Fetch failures collapse into the fixed
    /// error fragment; there is no retry. Returns the current container
    /// content, which is this render unless a newer one won the race.
    pub async fn refresh_feed(&self) -> Result<String> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let tpl_src = read_template(&self.template_dir, "feed_list.tpl")?;

        let outcome = self.client.list_posts().await;
        let html = render_fragment(outcome, &tpl_src)?;

        Ok(self.apply_if_current(seq, html))
    }

    /// Renders the full page: form state, error banners and a fresh feed.
    pub async fn render_page(&self, form: &FormState, errors: Vec<String>) -> Result<String> {
        let feed = self.refresh_feed().await?;
        let tpl_src = read_template(&self.template_dir, "feed.tpl")?;
        let page_renderer = PageRenderer::new(&tpl_src)?;
        Ok(page_renderer.render(&feed, form, errors))
    }

    /// Forwards the new post to the backend. The attempt is simply lost on
    /// failure; the caller reports it and the user resubmits.
    pub async fn submit(&self, new_post: &NewPost) -> Result<Post, FeedError> {
        let post = self.client.create_post(new_post).await?;
        info!("Blog post added: \"{}\" by {}", post.title, post.author_name);
        Ok(post)
    }

    fn apply_if_current(&self, seq: u64, html: String) -> String {
        let mut container = self.container.lock().unwrap();
        if seq >= container.seq {
            container.seq = seq;
            container.html = html;
        }
        container.html.clone()
    }
}

/// Maps a fetch outcome onto the feed fragment: the fixed "no posts"
/// placeholder, the fixed error placeholder (no partial list, ever), or one
/// block per post, newest first.
fn render_fragment(outcome: Result<Vec<Post>, FeedError>, tpl_src: &str) -> io::Result<String> {
    match outcome {
        Ok(posts) if posts.is_empty() => Ok(NO_POSTS_HTML.to_string()),
        Ok(mut posts) => {
            info!("Fetched {} blog posts", posts.len());
            sort_newest_first(&mut posts);
            Ok(FeedRenderer::new(tpl_src)?.render(&posts))
        }
        Err(err) => {
            error!("Error fetching blog posts: {}", err);
            Ok(FETCH_ERROR_HTML.to_string())
        }
    }
}

fn read_template(tpl_dir: &Path, file_name: &str) -> io::Result<String> {
    let full_path = tpl_dir.join(file_name);
    match fs::read_to_string(&full_path) {
        Ok(src) => Ok(src),
        Err(e) => Err(io::Error::new(
            e.kind(),
            format!("Error reading template {}: {}", full_path.to_str().unwrap_or(file_name), e),
        )),
    }
}
