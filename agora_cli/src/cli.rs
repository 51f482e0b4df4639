use agora_core::config::AgoraConfig;
use agora_core::model::{Category, Post, PostDraft, PostEdit, ProfileUpdate};
use agora_core::query::{CategoryFilter, SortMode};
use agora_core::routes::{Resolved, Route};
use agora_core::view::{Control, PostCard};
use agora_core::ForumStore;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::{BufRead, Write};

/// Run the interactive shell over `input` until EOF or `exit`.
pub fn run_shell<R, W>(store: ForumStore, config: &AgoraConfig, input: R, output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut session = CliSession {
        store,
        list_limit: config.list_limit,
        cards: HashMap::new(),
        out: output,
    };

    writeln!(session.out, "Agora shell ready. Type 'help' for a list of commands.")?;
    writeln!(
        session.out,
        "Signed in as {}",
        session.store.viewer().username
    )?;

    let mut lines = input.lines();
    loop {
        write!(session.out, "agora> ")?;
        session.out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(session.out, "Exiting")?;
            break;
        };
        let line = line.context("failed to read command line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let tokens = match shell_words::split(trimmed) {
            Ok(tokens) if !tokens.is_empty() => tokens,
            Ok(_) => continue,
            Err(err) => {
                writeln!(session.out, "Unable to parse command: {err}")?;
                continue;
            }
        };

        match session.handle_command(&tokens) {
            Ok(LoopAction::Continue) => {}
            Ok(LoopAction::Exit) => break,
            Err(err) => {
                writeln!(session.out, "Error: {err:#}")?;
            }
        }
    }
    Ok(())
}

struct CliSession<W: Write> {
    store: ForumStore,
    list_limit: usize,
    /// One card per post shown so far; interactions go through them.
    cards: HashMap<String, PostCard>,
    out: W,
}

enum LoopAction {
    Continue,
    Exit,
}

impl<W: Write> CliSession<W> {
    fn handle_command(&mut self, tokens: &[String]) -> Result<LoopAction> {
        let command = tokens[0].as_str();
        match command {
            "help" => self.print_help()?,
            "open" | "go" => {
                let path = tokens.get(1).map(String::as_str).unwrap_or("/");
                self.open(path)?;
            }
            "posts" | "feed" => {
                let filter = tokens
                    .get(1)
                    .map(|raw| CategoryFilter::parse(raw))
                    .unwrap_or_default();
                let sort = parse_sort(tokens.get(2))?;
                self.list_posts(&filter, sort)?;
            }
            "post" | "view" => {
                let Some(id) = tokens.get(1) else {
                    return self.usage("post <id>");
                };
                self.view_post(id)?;
            }
            "upvote" | "bookmark" | "like" => {
                let Some(id) = tokens.get(1) else {
                    return self.usage(&format!("{command} <id>"));
                };
                let control = match command {
                    "upvote" => Control::Upvote,
                    "bookmark" => Control::Bookmark,
                    _ => Control::Like,
                };
                self.press(id, control)?;
            }
            "comment" => {
                if tokens.len() < 3 {
                    return self.usage("comment <id> \"text\"");
                }
                self.comment(&tokens[1], &tokens[2..].join(" "))?;
            }
            "new-post" | "create" => {
                if tokens.len() < 3 {
                    return self.usage("new-post \"title\" \"content\" [category] [image]");
                }
                let mut draft = PostDraft::new(tokens[1].clone(), tokens[2].clone());
                if let Some(category) = tokens.get(3) {
                    draft = draft.with_category(category.clone());
                }
                if let Some(image) = tokens.get(4) {
                    draft = draft.with_image(image.clone());
                }
                let post = self.store.create_post(draft)?;
                writeln!(self.out, "Created post {}", post.id)?;
            }
            "edit" => {
                if tokens.len() < 4 {
                    return self.usage("edit <id> \"title\" \"content\" [image]");
                }
                let fields = PostEdit {
                    title: tokens[2].clone(),
                    content: tokens[3].clone(),
                    image: tokens.get(4).cloned(),
                };
                let post = self.store.edit_post(&tokens[1], fields)?;
                self.show(post);
                writeln!(self.out, "Updated post {}", tokens[1])?;
            }
            "delete" => {
                let Some(id) = tokens.get(1) else {
                    return self.usage("delete <id>");
                };
                let removed = self.store.delete_post(id)?;
                self.cards.remove(&removed.id);
                writeln!(self.out, "Deleted post {} ({})", removed.id, removed.title)?;
            }
            "categories" => {
                let query = tokens[1..].join(" ");
                let categories = self.store.list_categories(&query);
                self.print_categories(&categories)?;
            }
            "trending" => {
                let categories = self.store.trending_categories();
                self.print_categories(&categories)?;
            }
            "category" => {
                let Some(id) = tokens.get(1) else {
                    return self.usage("category <category_id> [latest|popular]");
                };
                let sort = parse_sort(tokens.get(2))?;
                let posts = self.store.posts_in_category(id, sort)?;
                self.print_posts(&posts)?;
            }
            "mine" | "my-threads" => {
                let posts = self.store.my_threads();
                self.print_posts(&posts)?;
            }
            "bookmarks" => {
                let posts = self.store.bookmarks();
                self.print_posts(&posts)?;
            }
            "search" => {
                let posts = self.store.search_posts(&tokens[1..].join(" "));
                self.print_posts(&posts)?;
            }
            "profile" => self.print_profile()?,
            "edit-profile" => {
                if tokens.len() < 4 {
                    return self.usage("edit-profile \"username\" \"bio\" \"avatar\"");
                }
                let user = self.store.update_profile(ProfileUpdate {
                    username: tokens[1].clone(),
                    bio: tokens[2].clone(),
                    avatar: tokens[3].clone(),
                })?;
                writeln!(self.out, "Profile saved for {}", user.username)?;
            }
            "dump" => {
                let posts = self.store.snapshot().posts().to_vec();
                let json = serde_json::to_string_pretty(&posts)?;
                writeln!(self.out, "{json}")?;
            }
            "quit" | "exit" => return Ok(LoopAction::Exit),
            other => {
                writeln!(
                    self.out,
                    "Unknown command '{other}'. Type 'help' for a list of commands."
                )?;
            }
        }
        Ok(LoopAction::Continue)
    }

    fn usage(&mut self, text: &str) -> Result<LoopAction> {
        writeln!(self.out, "Usage: {text}")?;
        Ok(LoopAction::Continue)
    }

    fn print_help(&mut self) -> Result<()> {
        const LINES: &[&str] = &[
            "Available commands:",
            "  help                         Show this help message",
            "  open <path>                  Render a page: /, /categories, /my-threads, /profile, /post/<id>",
            "  posts [category|all] [sort]  List posts, sort is 'latest' or 'popular'",
            "  post <id>                    Show a post with its comments",
            "  upvote|bookmark|like <id>    Toggle a flag on a post",
            "  comment <id> TEXT            Add a comment",
            "  new-post TITLE CONTENT [CATEGORY] [IMAGE]",
            "  edit <id> TITLE CONTENT [IMAGE]",
            "  delete <id>                  Remove a post",
            "  categories [query]           Search categories by name",
            "  trending                     List trending categories",
            "  category <id> [sort]         Posts in a category",
            "  mine | bookmarks             Your threads, your bookmarks",
            "  search QUERY                 Search post titles and content",
            "  profile | edit-profile USERNAME BIO AVATAR",
            "  dump                         Print all posts as JSON",
            "  exit                         Quit the shell",
        ];
        for line in LINES {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn open(&mut self, path: &str) -> Result<()> {
        let Resolved { route, redirected } = Route::resolve(path);
        if redirected {
            writeln!(self.out, "No page at {path}, showing {route}")?;
        }
        match route {
            Route::Posts => self.list_posts(&CategoryFilter::All, SortMode::Latest),
            Route::Categories => {
                let categories = self.store.list_categories("");
                self.print_categories(&categories)
            }
            Route::MyThreads => {
                let posts = self.store.my_threads();
                self.print_posts(&posts)
            }
            Route::Profile => self.print_profile(),
            Route::Login | Route::Signup => {
                writeln!(self.out, "Accounts are not modeled; you are always signed in.")?;
                Ok(())
            }
            Route::Post(id) => self.view_post(&id),
        }
    }

    fn list_posts(&mut self, filter: &CategoryFilter, sort: SortMode) -> Result<()> {
        let posts = self.store.list_posts(filter, sort);
        self.print_posts(&posts)
    }

    fn view_post(&mut self, id: &str) -> Result<()> {
        let post = self.store.get_post(id)?;
        self.show(post.clone());
        writeln!(self.out, "{} [{}]", post.title, post.id)?;
        writeln!(
            self.out,
            "by {} in {} at {}",
            post.author.username,
            post.category,
            post.created_at.format("%Y-%m-%d %H:%M")
        )?;
        if let Some(image) = &post.image {
            writeln!(self.out, "image: {image}")?;
        }
        writeln!(self.out, "{}", post.content)?;
        writeln!(self.out, "{}", status_line(&post))?;
        match &post.comments_list {
            Some(list) if list.is_empty() => writeln!(self.out, "  (no comments yet)")?,
            Some(list) => {
                for comment in list {
                    writeln!(
                        self.out,
                        "  - {} ({}): {}",
                        comment.author.username,
                        comment.created_at.format("%Y-%m-%d %H:%M"),
                        comment.content
                    )?;
                }
            }
            None => writeln!(self.out, "  ({} comments not loaded)", post.comments)?,
        }
        Ok(())
    }

    /// Refreshes (or creates) the card for a post from the store's answer.
    fn show(&mut self, post: Post) {
        match self.cards.get_mut(&post.id) {
            Some(card) => card.render(post),
            None => {
                self.cards.insert(post.id.clone(), PostCard::new(post));
            }
        }
    }

    /// Takes the card out of the map so it can call back into the store.
    fn take_card(&mut self, id: &str) -> Result<PostCard> {
        match self.cards.remove(id) {
            Some(card) => Ok(card),
            None => Ok(PostCard::new(self.store.get_post(id)?)),
        }
    }

    fn press(&mut self, id: &str, control: Control) -> Result<()> {
        let mut card = self.take_card(id)?;
        let outcome = card.click(control, &mut self.store);
        let line = status_line(card.post());
        self.cards.insert(id.to_string(), card);
        outcome?;
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn comment(&mut self, id: &str, text: &str) -> Result<()> {
        let mut card = self.take_card(id)?;
        let outcome = card.comment(text, &mut self.store);
        let count = card.post().comments;
        self.cards.insert(id.to_string(), card);
        outcome?;
        writeln!(self.out, "Comment added to {id} ({count} comments)")?;
        Ok(())
    }

    fn print_posts(&mut self, posts: &[Post]) -> Result<()> {
        if posts.is_empty() {
            writeln!(self.out, "No posts found")?;
            return Ok(());
        }
        for post in posts.iter().take(self.list_limit) {
            writeln!(
                self.out,
                "  [{}] {} ({}) {}",
                post.id,
                post.title,
                post.category,
                status_line(post)
            )?;
        }
        if posts.len() > self.list_limit {
            writeln!(self.out, "  ... {} more", posts.len() - self.list_limit)?;
        }
        Ok(())
    }

    fn print_categories(&mut self, categories: &[Category]) -> Result<()> {
        if categories.is_empty() {
            writeln!(self.out, "No categories found")?;
            return Ok(());
        }
        for category in categories {
            let trending = if category.is_trending { " (trending)" } else { "" };
            writeln!(
                self.out,
                "  [{}] {}{} - {} threads",
                category.id, category.name, trending, category.thread_count
            )?;
        }
        Ok(())
    }

    fn print_profile(&mut self) -> Result<()> {
        let user = self.store.viewer().clone();
        writeln!(self.out, "{} [{}]", user.username, user.id)?;
        if !user.bio.is_empty() {
            writeln!(self.out, "{}", user.bio)?;
        }
        writeln!(
            self.out,
            "followers {} | following {} | upvotes {} | threads {}",
            user.followers, user.following, user.total_upvotes, user.threads_created
        )?;
        Ok(())
    }
}

fn parse_sort(raw: Option<&String>) -> Result<SortMode> {
    match raw {
        Some(raw) => Ok(raw.parse::<SortMode>()?),
        None => Ok(SortMode::default()),
    }
}

fn status_line(post: &Post) -> String {
    let mut flags = Vec::new();
    if post.is_upvoted {
        flags.push("upvoted");
    }
    if post.is_bookmarked {
        flags.push("bookmarked");
    }
    if post.is_liked {
        flags.push("liked");
    }
    let mut line = format!("▲ {} | {} comments", post.upvotes, post.comments);
    if !flags.is_empty() {
        line.push_str(&format!(" | {}", flags.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::seed::SeedData;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn run(script: &str) -> String {
        let config = AgoraConfig::default();
        let store = ForumStore::new(SeedData::builtin().unwrap(), &config).unwrap();
        let mut output = Vec::new();
        run_shell(store, &config, Cursor::new(script.to_string()), &mut output).expect("shell");
        String::from_utf8(output).expect("utf8 output")
    }

    #[test]
    fn upvote_prints_new_count() {
        let output = run("upvote 1\nupvote 2\nexit\n");
        assert!(output.contains("▲ 43 | 2 comments | upvoted"), "{output}");
        assert!(output.contains("▲ 34 | 1 comments | bookmarked"), "{output}");
    }

    #[test]
    fn errors_do_not_stop_the_loop() {
        let output = run("upvote 99\ncomment 1 \"   \"\nposts all sideways\nhelp\n");
        assert!(output.contains("Error: post not found: 99"), "{output}");
        assert!(output.contains("Error: validation failed: comment text"), "{output}");
        assert!(output.contains("unknown sort mode"), "{output}");
        assert!(output.contains("Available commands:"), "{output}");
        assert!(output.trim_end().ends_with("Exiting"), "{output}");
    }

    #[test]
    fn unknown_route_redirects_home() {
        let output = run("open /nowhere\n");
        assert!(output.contains("No page at /nowhere, showing /"), "{output}");
        assert!(output.contains("[1] Getting Started with React and TypeScript"));
    }

    #[test]
    fn post_page_shows_comments() {
        let output = run("comment 3 \"Nice one\"\nopen /post/3\n");
        assert!(output.contains("Comment added to 3 (1 comments)"), "{output}");
        assert!(output.contains("currentuser"), "{output}");
        assert!(output.contains(": Nice one"), "{output}");
    }

    #[test]
    fn create_edit_delete_cycle() {
        let output = run(concat!(
            "new-post \"Hello\" \"World\" Rust\n",
            "posts rust\n",
            "delete 1\n",
            "post 1\n",
        ));
        assert!(output.contains("Created post "), "{output}");
        assert!(output.contains("Hello (Rust)"), "{output}");
        assert!(output.contains("Deleted post 1"), "{output}");
        assert!(output.contains("Error: post not found: 1"), "{output}");
    }

    #[test]
    fn category_listing() {
        let output = run("categories dev\n");
        let listed: Vec<_> = output
            .lines()
            .filter(|line| line.contains(" threads"))
            .map(str::trim)
            .collect();
        assert_eq!(
            listed,
            vec![
                "[2] Web Development (trending) - 120 threads",
                "[4] Mobile Development - 95 threads",
            ]
        );
    }
}
