use clap::Parser;
use eyre::Context;
use std::fmt::Write as _;
use std::io::{IsTerminal, Write as _};
use tokio::io::AsyncBufReadExt;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_playlist_editor::ErrorNotice;
use youtube_playlist_editor::auth::{CredentialGate, SessionStorage};
use youtube_playlist_editor::item_detail::{DetailState, ItemDetail};
use youtube_playlist_editor::my_playlists::{MyPlaylists, MyPlaylistsState};
use youtube_playlist_editor::oauth::OAuthManager;
use youtube_playlist_editor::playlist_view::{ListController, ViewState};
use youtube_playlist_editor::youtube_api::{DEFAULT_API_BASE, YouTubeClient};

/// Browse and edit YouTube playlists from the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// API key used for every request.
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// OAuth client ID of an installed application; needed to sign in.
    #[arg(long, env = "YOUTUBE_OAUTH_CLIENT_ID")]
    client_id: Option<String>,

    #[arg(long, env = "YOUTUBE_OAUTH_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Playlist ID or URL to open on start.
    playlist: Option<String>,
}

const HELP: &str = "\
commands:
  open <playlist id or url>   show a playlist from its first page
  add <video id or url>       append a video to the open playlist
  mark <row>...               mark or unmark rows for deletion
  delete                      delete the marked rows
  next | prev                 turn the page
  show <row>                  show one row in detail
  move <position>             move the row being shown to a new position
  mine [next | prev]          list your own playlists
  login | logout | status     manage sign-in
  help | quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Open(String),
    Add(String),
    Mark(Vec<usize>),
    Delete,
    Next,
    Prev,
    Show(usize),
    Move(i64),
    Mine(Option<Page>),
    Login,
    Logout,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Next,
    Prev,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
enum ParseError {
    #[error("unknown command `{0}`; try `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a number")]
    NotANumber(String),
}

fn number<T: std::str::FromStr>(arg: &str) -> Result<T, ParseError> {
    arg.parse().map_err(|_| ParseError::NotANumber(arg.to_string()))
}

/// Parses one input line. Blank lines are `Ok(None)`.
fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));
    let required = |name: &'static str| {
        if rest.is_empty() {
            Err(ParseError::MissingArgument(name))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word {
        "" => return Ok(None),
        "open" | "o" => Command::Open(required("open")?),
        "add" | "a" => Command::Add(required("add")?),
        "mark" | "m" => {
            required("mark")?;
            Command::Mark(
                rest.split_whitespace()
                    .map(number)
                    .collect::<Result<_, _>>()?,
            )
        }
        "delete" | "d" => Command::Delete,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "show" | "s" => Command::Show(number(&required("show")?)?),
        "move" => Command::Move(number(&required("move")?)?),
        "mine" => match rest {
            "" => Command::Mine(None),
            "next" | "n" => Command::Mine(Some(Page::Next)),
            "prev" | "p" => Command::Mine(Some(Page::Prev)),
            other => return Err(ParseError::Unknown(format!("mine {other}"))),
        },
        "login" => Command::Login,
        "logout" => Command::Logout,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn render_error(out: &mut String, error: &ErrorNotice) {
    let _ = writeln!(out, "error: {}", error.message);
    if let Some(fix) = &error.suggested_fix {
        let _ = writeln!(out, "  {fix}");
    }
}

fn render_list(state: &ViewState) -> String {
    let mut out = String::new();
    if let Some(error) = &state.error {
        render_error(&mut out, error);
    }
    let Some(playlist_id) = &state.playlist_id else {
        return out;
    };

    match &state.playlist {
        Some(playlist) if !playlist.snippet.title.is_empty() => {
            let _ = writeln!(out, "{} ({playlist_id})", playlist.snippet.title);
        }
        _ => {
            let _ = writeln!(out, "{playlist_id}");
        }
    }
    for (row, item) in state.items.iter().enumerate() {
        let mark = if state.marked.contains(&row) { 'x' } else { ' ' };
        let _ = writeln!(
            out,
            "[{mark}] {row:>3}  #{:<4} {} ({})",
            item.snippet.position, item.snippet.title, item.snippet.resource_id.video_id
        );
    }
    let _ = write!(
        out,
        "{} shown, {} in playlist",
        state.items.len(),
        state.page_info.total_results
    );
    if state.prev_page_token.is_some() {
        out.push_str("  [prev]");
    }
    if state.next_page_token.is_some() {
        out.push_str("  [next]");
    }
    out.push('\n');
    out
}

fn render_detail(state: &DetailState) -> String {
    let mut out = String::new();
    if let Some(error) = &state.error {
        render_error(&mut out, error);
    }
    if let Some(item) = &state.item {
        let snippet = &item.snippet;
        let _ = writeln!(out, "{}", snippet.title);
        if let Some(channel) = &snippet.channel_title {
            let _ = writeln!(out, "  by {channel}");
        }
        let _ = writeln!(out, "  video     {}", snippet.resource_id.video_id);
        let _ = writeln!(out, "  playlist  {}", snippet.playlist_id);
        let _ = writeln!(out, "  position  {}", snippet.position);
        if let Some(published) = &snippet.published_at {
            let _ = writeln!(out, "  added     {published}");
        }
    }
    out
}

fn render_mine(state: &MyPlaylistsState) -> String {
    let mut out = String::new();
    if let Some(error) = &state.error {
        render_error(&mut out, error);
    }
    if let Some(response) = &state.response {
        for playlist in &response.items {
            let privacy = playlist
                .status
                .map(|s| s.privacy_status.to_string())
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{:<36} {:<9} {}",
                playlist.id, privacy, playlist.snippet.title
            );
        }
        if response.prev_page_token.is_some() {
            out.push_str("[mine prev]  ");
        }
        if response.next_page_token.is_some() {
            out.push_str("[mine next]");
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

struct Shell {
    list: ListController<YouTubeClient>,
    detail: ItemDetail<YouTubeClient>,
    mine: MyPlaylists<YouTubeClient>,
    gate: Option<CredentialGate<OAuthManager>>,
    session: SessionStorage,
}

impl Shell {
    async fn open(&self, raw: &str) {
        self.list.open(raw).await;
        print!("{}", render_list(&self.list.state()));
    }

    /// Returns `false` once the user asks to leave.
    async fn run(&self, command: Command) -> bool {
        match command {
            Command::Open(raw) => self.open(&raw).await,
            Command::Add(raw) => {
                self.list.clear_errors();
                self.list.add_item(&raw).await;
                print!("{}", render_list(&self.list.state()));
            }
            Command::Mark(rows) => {
                let len = self.list.state().items.len();
                for row in rows {
                    if row < len {
                        self.list.toggle_mark(row);
                    } else {
                        println!("no row {row}");
                    }
                }
                print!("{}", render_list(&self.list.state()));
            }
            Command::Delete => {
                self.list.clear_errors();
                self.list.delete_marked().await;
                print!("{}", render_list(&self.list.state()));
            }
            Command::Next | Command::Prev => {
                self.list.clear_errors();
                if command == Command::Next {
                    self.list.to_next_page().await;
                } else {
                    self.list.to_prev_page().await;
                }
                print!("{}", render_list(&self.list.state()));
            }
            Command::Show(row) => {
                let Some(item) = self.list.state().items.get(row).cloned() else {
                    println!("no row {row}");
                    return true;
                };
                self.detail.clear_errors();
                self.detail.load(&item.id).await;
                print!("{}", render_detail(&self.detail.state()));
            }
            Command::Move(position) => {
                if self.detail.state().item.is_none() {
                    println!("`show` a row first");
                    return true;
                }
                self.detail.clear_errors();
                match self.detail.save_position(Some(position)).await {
                    Some(playlist_id) => {
                        self.list.fetch_items(&playlist_id).await;
                        print!("{}", render_list(&self.list.state()));
                    }
                    None => print!("{}", render_detail(&self.detail.state())),
                }
            }
            Command::Mine(page) => {
                match page {
                    None => self.mine.fetch().await,
                    Some(Page::Next) => self.mine.to_next_page().await,
                    Some(Page::Prev) => self.mine.to_prev_page().await,
                }
                print!("{}", render_mine(&self.mine.state()));
            }
            Command::Login => match &self.gate {
                Some(gate) => match gate.sign_in().await {
                    Ok(()) => println!("signed in"),
                    Err(e) => println!("sign-in failed: {e:#}"),
                },
                None => println!("signing in needs --client-id (or YOUTUBE_OAUTH_CLIENT_ID)"),
            },
            Command::Logout => {
                let result = match &self.gate {
                    Some(gate) => gate.sign_out().await,
                    None => {
                        self.session
                            .remove_item(youtube_playlist_editor::auth::SESSION_STORAGE_KEY);
                        Ok(())
                    }
                };
                match result {
                    Ok(()) => println!("signed out"),
                    Err(e) => println!("signed out, but revoking the token failed: {e:#}"),
                }
            }
            Command::Status => {
                if self.session.access_token().is_ok() {
                    println!("signed in");
                } else {
                    println!("signed out");
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        true
    }
}

fn prompt() -> eyre::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(b"> ").context("write prompt")?;
    stdout.flush().context("flush prompt")
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let yt = YouTubeClient::with_base_url(args.api_key, reqwest::Client::new(), args.api_base);
    let session = SessionStorage::new();
    let shell = Shell {
        list: ListController::new(yt.clone(), session.clone()),
        detail: ItemDetail::new(yt.clone(), session.clone()),
        mine: MyPlaylists::new(yt, session.clone()),
        gate: args.client_id.map(|id| {
            CredentialGate::new(OAuthManager::new(id, args.client_secret), session.clone())
        }),
        session,
    };

    if let Some(playlist) = &args.playlist {
        shell.open(playlist).await;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = LinesStream::new(stdin.lines());
    prompt()?;
    while let Some(line) = lines.next().await {
        let line = line.context("read command")?;
        match parse(&line) {
            Ok(Some(command)) => {
                if !shell.run(command).await {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => println!("{e}"),
        }
        prompt()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use youtube_playlist_editor::youtube_api::{PageInfo, Playlist, PlaylistItem};

    #[test]
    fn args() {
        Args::try_parse_from(["playlist-editor", "--api-key", "k", "PL123"]).unwrap();
        Args::try_parse_from(["playlist-editor", "--api-key", "k"]).unwrap();
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(
            parse("open https://youtube.com/playlist?list=PL1&x=y "),
            Ok(Some(Command::Open(
                "https://youtube.com/playlist?list=PL1&x=y".to_string()
            )))
        );
        assert_eq!(parse("m 3  0 12"), Ok(Some(Command::Mark(vec![3, 0, 12]))));
        assert_eq!(parse("move 4"), Ok(Some(Command::Move(4))));
        assert_eq!(parse("move -1"), Ok(Some(Command::Move(-1))));
        assert_eq!(parse("mine next"), Ok(Some(Command::Mine(Some(Page::Next)))));
        assert_eq!(parse("q"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!(parse("add"), Err(ParseError::MissingArgument("add")));
        assert_eq!(
            parse("mark 1 two"),
            Err(ParseError::NotANumber("two".to_string()))
        );
        assert_eq!(parse("shuffle"), Err(ParseError::Unknown("shuffle".to_string())));
    }

    #[test]
    fn renders_list() {
        let mut item = PlaylistItem::default();
        item.snippet.title = "Never Gonna Give You Up".to_string();
        item.snippet.position = 7;
        item.snippet.resource_id.video_id = "dQw4w9WgXcQ".to_string();
        let mut playlist = Playlist::default();
        playlist.snippet.title = "Mix".to_string();

        let state = ViewState {
            playlist_id: Some("PL1".to_string()),
            playlist: Some(playlist),
            items: vec![PlaylistItem::default(), item],
            page_info: PageInfo {
                total_results: 60,
                results_per_page: 50,
            },
            next_page_token: Some("N".to_string()),
            marked: [1].into(),
            error: Some(ErrorNotice {
                message: "403 - Forbidden".to_string(),
                suggested_fix: None,
            }),
            ..Default::default()
        };

        insta::assert_snapshot!(render_list(&state), @r"
        error: 403 - Forbidden
        Mix (PL1)
        [ ]   0  #0     ()
        [x]   1  #7    Never Gonna Give You Up (dQw4w9WgXcQ)
        2 shown, 60 in playlist  [next]
        ");
    }

    #[test]
    fn renders_nothing_without_playlist() {
        assert_eq!(render_list(&ViewState::default()), "");
    }

    #[test]
    fn renders_own_playlists_with_privacy() {
        let response: youtube_playlist_editor::youtube_api::PlaylistListResponse =
            serde_json::from_value(serde_json::json!({
                "nextPageToken": "N",
                "items": [
                    { "id": "PL1", "snippet": { "title": "Mix" }, "status": { "privacyStatus": "unlisted" } },
                    { "id": "PL2", "snippet": { "title": "Old" } }
                ]
            }))
            .unwrap();
        let state = MyPlaylistsState {
            response: Some(response),
            ..Default::default()
        };

        insta::assert_snapshot!(render_mine(&state), @r"
        PL1                                  unlisted  Mix
        PL2                                            Old
        [mine next]
        ");
    }
}
