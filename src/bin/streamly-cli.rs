//! Interactive terminal front end for the Streamly client.
//!
//! Drives the same session store, route guard, and page state the browser
//! UI would: commands navigate between routes, the guard decides whether a
//! protected screen renders or bounces to the login screen, and each
//! screen's fetches go through the page types in `streamly_client::pages`.

use eyre::Context;
use jiff::Timestamp;
use std::io::{IsTerminal, Write};
use std::path::Path;
use streamly_client::api::{Comment, FilePart, RegisterForm, Video};
use streamly_client::pages::{
    ChannelPage, HistoryPage, HomePage, Mount, MountToken, PlayerPage, PlaylistDetailPage,
    PlaylistsPage, ProfilePage, SignupPage, UploadPage, format_duration, format_views, time_ago,
};
use streamly_client::{ApiClient, Credentials, Route, RouteDecision, Router, SessionStore};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// The page currently on screen, holding whatever state its commands need.
enum Screen {
    Blank,
    Home(HomePage),
    Player(PlayerPage),
    Channel(ChannelPage),
    History(HistoryPage),
    Playlists(PlaylistsPage),
    PlaylistDetail(PlaylistDetailPage),
    Profile(ProfilePage),
    Upload(UploadPage),
    Signup,
    Login,
}

struct App {
    store: SessionStore,
    router: Router,
    mount: Mount,
    token: MountToken,
    screen: Screen,
}

impl App {
    fn new(store: SessionStore) -> Self {
        let router = Router::new(&store);
        let mount = Mount::new();
        let token = mount.remount();
        Self {
            store,
            router,
            mount,
            token,
            screen: Screen::Blank,
        }
    }

    /// Navigates to a route and renders whatever the guard lets through.
    async fn goto(&mut self, route: Route) {
        let decision = self.router.navigate(route);
        self.apply(decision).await;
    }

    /// Re-applies the guard to the current route; called after anything
    /// that may have changed the session.
    async fn refresh_guard(&mut self) {
        let decision = self.router.reevaluate();
        if let RouteDecision::Redirect(_) = decision {
            self.apply(decision).await;
        }
    }

    async fn apply(&mut self, decision: RouteDecision) {
        match decision {
            RouteDecision::Defer => {
                println!("(still resolving your session, try again in a moment)");
            }
            RouteDecision::Redirect(_) => {
                println!("You need to sign in first.");
                self.show_current().await;
            }
            RouteDecision::Allow => self.show_current().await,
        }
    }

    /// Builds and loads the page for the router's current route.
    async fn show_current(&mut self) {
        self.token = self.mount.remount();
        let viewer = self.store.snapshot().user;
        let route = self.router.current().clone();
        println!("--- {route} ---");

        match route {
            Route::Home { query } => {
                let mut page = HomePage::new(query);
                page.load(self.store.api(), &self.token).await;
                print_feed(&page);
                self.screen = Screen::Home(page);
            }
            Route::Watch { video_id } => {
                let mut page = PlayerPage::new(video_id);
                page.load(self.store.api(), &self.token, viewer.as_ref())
                    .await;
                print_player(&page);
                self.screen = Screen::Player(page);
            }
            Route::Channel => {
                let mut page = ChannelPage::new();
                page.load(self.store.api(), &self.token).await;
                print_channel(&page);
                self.screen = Screen::Channel(page);
            }
            Route::History => {
                let mut page = HistoryPage::new();
                page.load(self.store.api(), &self.token).await;
                print_history(&page);
                self.screen = Screen::History(page);
            }
            Route::Playlists => {
                let mut page = PlaylistsPage::new();
                page.load(self.store.api(), &self.token).await;
                print_playlists(&page);
                self.screen = Screen::Playlists(page);
            }
            Route::PlaylistDetail { playlist_id } => {
                let mut page = PlaylistDetailPage::new(playlist_id);
                page.load(self.store.api(), &self.token).await;
                print_playlist_detail(&page);
                self.screen = Screen::PlaylistDetail(page);
            }
            Route::Profile => {
                let mut page = ProfilePage::new();
                page.load(self.store.api(), &self.token).await;
                print_profile(&page);
                self.screen = Screen::Profile(page);
            }
            Route::Upload => {
                println!("Upload a video with:");
                println!("  title <text> / desc <text> / attach <video path> / thumb <image path>");
                println!("then `publish`.");
                self.screen = Screen::Upload(UploadPage::new());
            }
            Route::Signup => {
                println!("Create an account with `register` (you will be prompted).");
                self.screen = Screen::Signup;
            }
            Route::Login => {
                println!("Sign in with `login <username or email> <password>`.");
                self.screen = Screen::Login;
            }
        }
    }

    async fn handle(&mut self, command: &str, rest: &str) -> eyre::Result<bool> {
        match command {
            "quit" | "exit" => return Ok(false),
            "help" => print_help(),
            "home" => self.goto(Route::home()).await,
            "search" => {
                let query = (!rest.is_empty()).then(|| rest.to_owned());
                self.goto(Route::Home { query }).await;
            }
            "watch" if !rest.is_empty() => {
                self.goto(Route::Watch {
                    video_id: rest.to_owned(),
                })
                .await;
            }
            "channel" => self.goto(Route::Channel).await,
            "history" => self.goto(Route::History).await,
            "playlists" => self.goto(Route::Playlists).await,
            "playlist" if !rest.is_empty() => {
                self.goto(Route::PlaylistDetail {
                    playlist_id: rest.to_owned(),
                })
                .await;
            }
            "profile" => self.goto(Route::Profile).await,
            "upload" => self.goto(Route::Upload).await,
            "signup" => self.goto(Route::Signup).await,
            "refresh" => self.show_current().await,
            "login" => {
                let mut words = rest.split_whitespace();
                match (words.next(), words.next()) {
                    (Some(identity), Some(password)) => {
                        if self.store.login(&Credentials::new(identity, password)).await {
                            println!("Signed in.");
                            if matches!(self.router.current(), Route::Login) {
                                self.goto(Route::home()).await;
                            }
                        } else {
                            println!("Login failed. Check your credentials.");
                        }
                    }
                    _ => println!("usage: login <username or email> <password>"),
                }
            }
            "logout" => {
                if self.store.logout().await {
                    println!("Signed out.");
                    self.refresh_guard().await;
                } else {
                    println!("Logout cancelled.");
                }
            }
            "register" => {
                // A mistyped file path should not take the REPL down.
                if let Err(e) = self.register().await {
                    println!("Registration aborted: {e:#}");
                }
            }
            _ => {
                if !self.handle_screen(command, rest).await? {
                    println!("Unknown command; try `help`.");
                }
            }
        }
        Ok(true)
    }

    /// Commands that only make sense on the current screen.
    async fn handle_screen(&mut self, command: &str, rest: &str) -> eyre::Result<bool> {
        let viewer = self.store.snapshot().user;
        // Navigation requested by a screen command; performed once the
        // borrow of the screen ends.
        let mut follow = None;
        match (&mut self.screen, command) {
            (Screen::Player(page), "like") => {
                page.toggle_like(self.store.api(), &self.token, viewer.as_ref())
                    .await;
                print_player_status(page);
            }
            (Screen::Player(page), "subscribe") => {
                page.toggle_subscription(self.store.api(), &self.token, viewer.as_ref())
                    .await;
                print_player_status(page);
            }
            (Screen::Player(page), "comment") => {
                page.post_comment(self.store.api(), &self.token, rest).await;
                print_comments(page);
            }
            (Screen::Player(page), "more") => {
                page.load_more_comments(self.store.api(), &self.token).await;
                print_comments(page);
            }
            (Screen::Player(page), "open") => match &page.video {
                Some(video) => match webbrowser::open(&video.video_file) {
                    Ok(()) => println!("Opened {} in your browser.", video.video_file),
                    Err(e) => println!("Failed to open the browser: {e}"),
                },
                None => println!("No video loaded."),
            },
            (Screen::Playlists(page), "create") => {
                let name = prompt("Playlist name: ")?;
                let description = prompt("Description: ")?;
                page.create(self.store.api(), &self.token, &name, &description)
                    .await;
                print_playlists(page);
            }
            (Screen::Playlists(page), "delete") if !rest.is_empty() => {
                page.delete(self.store.api(), &self.token, rest, confirm_on_stdin)
                    .await;
                print_playlists(page);
            }
            (Screen::PlaylistDetail(page), "rename") => {
                let name = prompt("New name: ")?;
                let description = prompt("New description: ")?;
                page.update(self.store.api(), &self.token, &name, &description)
                    .await;
                print_playlist_detail(page);
            }
            (Screen::PlaylistDetail(page), "add") if !rest.is_empty() => {
                page.add_video(self.store.api(), &self.token, rest).await;
                print_playlist_detail(page);
            }
            (Screen::PlaylistDetail(page), "remove") if !rest.is_empty() => {
                page.remove_video(self.store.api(), &self.token, rest).await;
                print_playlist_detail(page);
            }
            (Screen::Profile(page), "update") => {
                let full_name = prompt("Full name: ")?;
                let email = prompt("Email: ")?;
                page.update_account(self.store.api(), &self.token, &full_name, &email)
                    .await;
                print_profile(page);
            }
            (Screen::Profile(page), "passwd") => {
                let old = prompt("Old password: ")?;
                let new = prompt("New password: ")?;
                page.change_password(self.store.api(), &self.token, &old, &new)
                    .await;
                print_profile_messages(page);
            }
            (Screen::Profile(page), "avatar") if !rest.is_empty() => {
                if let Some(file) = load_file_or_report(rest) {
                    page.update_avatar(self.store.api(), &self.token, file).await;
                    print_profile(page);
                }
            }
            (Screen::Profile(page), "cover") if !rest.is_empty() => {
                if let Some(file) = load_file_or_report(rest) {
                    page.update_cover_image(self.store.api(), &self.token, file)
                        .await;
                    print_profile(page);
                }
            }
            (Screen::Upload(page), "title") => {
                page.title = rest.to_owned();
            }
            (Screen::Upload(page), "desc") => {
                page.description = rest.to_owned();
            }
            (Screen::Upload(page), "attach") if !rest.is_empty() => {
                if let Some(file) = load_file_or_report(rest) {
                    page.set_video_file(file);
                    match &page.error {
                        Some(error) => println!("{error}"),
                        None => println!("Video file attached."),
                    }
                }
            }
            (Screen::Upload(page), "thumb") if !rest.is_empty() => {
                if let Some(file) = load_file_or_report(rest) {
                    page.set_thumbnail(file);
                    match &page.error {
                        Some(error) => println!("{error}"),
                        None => println!("Thumbnail attached."),
                    }
                }
            }
            (Screen::Upload(page), "publish") => {
                let Some(owner) = viewer.as_ref() else {
                    println!("You need to sign in first.");
                    return Ok(true);
                };
                match page.submit(self.store.api(), &self.token, owner).await {
                    Some(video_id) => {
                        println!("Published!");
                        follow = Some(Route::Watch { video_id });
                    }
                    None => {
                        if let Some(error) = &page.error {
                            println!("{error}");
                        }
                    }
                }
            }
            _ => return Ok(false),
        }
        if let Some(route) = follow {
            self.goto(route).await;
        }
        Ok(true)
    }

    /// Interactive account creation, then an automatic sign-in.
    async fn register(&mut self) -> eyre::Result<()> {
        let full_name = prompt("Full name: ")?;
        let email = prompt("Email: ")?;
        let username = prompt("Username: ")?;
        let password = prompt("Password: ")?;
        let avatar = read_file_part(&prompt("Avatar image path: ")?)?;
        let cover = prompt("Cover image path (blank for none): ")?;
        let cover_image = if cover.is_empty() {
            None
        } else {
            Some(read_file_part(&cover)?)
        };

        let form = RegisterForm {
            full_name,
            email,
            username,
            password,
            avatar,
            cover_image,
        };
        let mut page = SignupPage::new();
        if page.submit(&self.store, &self.token, form).await {
            println!("Welcome aboard!");
            self.goto(Route::home()).await;
        } else if let Some(error) = &page.error {
            println!("{error}");
        }
        Ok(())
    }
}

/// Blocking yes/no prompt; wired into the session store as its logout
/// confirmation and reused for playlist deletion.
fn confirm_on_stdin(question: &str) -> bool {
    match prompt(&format!("{question} [y/N] ")) {
        Ok(answer) => {
            let answer = answer.to_ascii_lowercase();
            answer == "y" || answer == "yes"
        }
        Err(_) => false,
    }
}

fn prompt(question: &str) -> eyre::Result<String> {
    print!("{question}");
    std::io::stdout().flush().context("flush prompt")?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("read from stdin")?;
    Ok(line.trim().to_owned())
}

/// Loads a file from disk into a multipart-ready part, guessing the MIME
/// type from the extension.
fn read_file_part(path: &str) -> eyre::Result<FilePart> {
    let path = Path::new(path.trim());
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_owned());
    Ok(FilePart::new(file_name, guess_mime(path), bytes))
}

fn load_file_or_report(path: &str) -> Option<FilePart> {
    match read_file_part(path) {
        Ok(part) => Some(part),
        Err(e) => {
            println!("Cannot read {path}: {e:#}");
            None
        }
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn video_line(video: &Video, now: Timestamp) -> String {
    let channel = video
        .owner
        .as_ref()
        .map(|owner| owner.display_name())
        .unwrap_or("Unknown Channel");
    let duration = format_duration(video.duration);
    let duration = if duration.is_empty() {
        String::new()
    } else {
        format!(" [{duration}]")
    };
    format!(
        "[{}] {}{} | {} | {} views | {}",
        video.id,
        video.title,
        duration,
        channel,
        format_views(video.views),
        time_ago(video.created_at, now),
    )
}

fn print_feed(page: &HomePage) {
    if let Some(error) = &page.error {
        println!("{error}");
        return;
    }
    if let Some(query) = page.query() {
        println!("Search results for \"{query}\"");
    }
    if page.videos.is_empty() {
        println!("No videos found.");
        return;
    }
    let now = Timestamp::now();
    for video in &page.videos {
        println!("  {}", video_line(video, now));
    }
    println!("(watch <id> to play one)");
}

fn print_player(page: &PlayerPage) {
    if let Some(error) = &page.error {
        println!("{error}");
        return;
    }
    let Some(video) = &page.video else {
        println!("Loading...");
        return;
    };
    let now = Timestamp::now();
    println!("{}", video.title);
    println!(
        "{} views | {}",
        format_views(video.views),
        time_ago(video.created_at, now)
    );
    if let Some(owner) = &video.owner {
        println!(
            "Channel: {} | {} subscribers{}",
            owner.display_name(),
            page.subscriber_count,
            if page.subscribed { " | subscribed" } else { "" },
        );
    }
    println!();
    println!("{}", video.description);
    println!();
    print_player_status(page);
    print_comments(page);
    if !page.related.is_empty() {
        println!("Related:");
        for video in &page.related {
            println!("  {}", video_line(video, now));
        }
    }
    println!("(like / subscribe / comment <text> / more / open)");
}

fn print_player_status(page: &PlayerPage) {
    if let Some(error) = &page.error {
        println!("{error}");
    }
    println!(
        "{} {} likes{}",
        if page.liked { "[liked]" } else { "[ like ]" },
        page.likes_count,
        if page.subscribed { " | subscribed" } else { "" },
    );
}

fn print_comments(page: &PlayerPage) {
    println!("Comments:");
    if page.comments.is_empty() {
        println!("  (none yet)");
    }
    let now = Timestamp::now();
    for comment in &page.comments {
        print_comment(comment, now);
    }
    if page.has_more_comments {
        println!("  (`more` loads the next page)");
    }
}

fn print_comment(comment: &Comment, now: Timestamp) {
    println!(
        "  {} ({}): {}",
        comment.owner.username,
        time_ago(comment.created_at, now),
        comment.content,
    );
}

fn print_channel(page: &ChannelPage) {
    if let Some(error) = &page.error {
        println!("{error}");
    }
    if let Some(stats) = &page.stats {
        println!("Channel: {}", stats.username);
        println!(
            "{} subscribers | {} videos | {} views | {} likes",
            stats.subscriber_count, stats.video_count, stats.view_count, stats.like_count,
        );
    }
    if !page.videos.is_empty() {
        println!("Uploads:");
        let now = Timestamp::now();
        for video in &page.videos {
            println!("  {}", video_line(video, now));
        }
    }
}

fn print_history(page: &HistoryPage) {
    if let Some(error) = &page.error {
        println!("{error}");
        return;
    }
    if page.videos.is_empty() {
        println!("No watch history yet.");
        return;
    }
    let now = Timestamp::now();
    for video in &page.videos {
        println!("  {}", video_line(video, now));
    }
}

fn print_playlists(page: &PlaylistsPage) {
    if let Some(error) = &page.error {
        println!("{error}");
    }
    if page.playlists.is_empty() {
        println!("No playlists yet.");
    } else {
        for playlist in &page.playlists {
            println!(
                "  [{}] {} ({} videos) - {}",
                playlist.id,
                playlist.name,
                playlist.videos.len(),
                playlist.description,
            );
        }
    }
    println!("(create / delete <id> / playlist <id> to open one)");
}

fn print_playlist_detail(page: &PlaylistDetailPage) {
    if let Some(error) = &page.error {
        println!("{error}");
        return;
    }
    let Some(playlist) = &page.playlist else {
        println!("Loading...");
        return;
    };
    println!("{}: {}", playlist.name, playlist.description);
    if playlist.videos.is_empty() {
        println!("  (empty)");
    } else {
        let now = Timestamp::now();
        for video in &playlist.videos {
            println!("  {}", video_line(video, now));
        }
    }
    println!("(rename / add <video id> / remove <video id>)");
}

fn print_profile(page: &ProfilePage) {
    print_profile_messages(page);
    let Some(user) = &page.user else {
        println!("Loading profile...");
        return;
    };
    println!("@{} - {}", user.username, user.full_name);
    println!("Email: {}", user.email);
    if let Some(avatar) = &user.avatar {
        println!("Avatar: {avatar}");
    }
    if let Some(cover) = &user.cover_image {
        println!("Cover: {cover}");
    }
    println!("(update / passwd / avatar <path> / cover <path>)");
}

fn print_profile_messages(page: &ProfilePage) {
    if let Some(notice) = &page.notice {
        println!("{notice}");
    }
    if let Some(error) = &page.error {
        println!("{error}");
    }
}

fn print_help() {
    println!("Navigation:");
    println!("  home                     the video feed");
    println!("  search <terms>           search the feed");
    println!("  watch <video id>         open a video");
    println!("  channel                  your channel dashboard");
    println!("  history                  your watch history");
    println!("  playlists                your playlists");
    println!("  playlist <id>            one playlist's videos");
    println!("  profile                  your account");
    println!("  upload                   publish a video");
    println!("  signup                   create an account");
    println!("  refresh                  reload the current screen");
    println!("Session:");
    println!("  login <identity> <pw>    sign in (username or email)");
    println!("  logout                   sign out (asks first)");
    println!("  register                 create an account interactively");
    println!("Each screen lists its own commands when shown. `quit` exits.");
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let api = ApiClient::from_env()?;
    println!("streamly, talking to {}", api.base_url());

    let store = SessionStore::new(api, confirm_on_stdin);
    store.check().await;

    let mut app = App::new(store);
    app.goto(Route::home()).await;

    loop {
        print!("> ");
        std::io::stdout().flush().context("flush prompt")?;

        let mut line = String::new();
        let read = std::io::stdin()
            .read_line(&mut line)
            .context("read command")?;
        if read == 0 {
            // EOF
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        if !app.handle(command, rest).await? {
            break;
        }
        // Anything above may have changed the session; the guard gets the
        // final say on what stays on screen.
        app.refresh_guard().await;
    }

    println!("Bye!");
    Ok(())
}
