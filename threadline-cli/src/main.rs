use std::io::{stdin, stdout, Write};
use std::time::Duration;

use chrono::Utc;
use log::info;
use structopt::StructOpt;
use termion::cursor;
use termion::event::Key;
use termion::input::TermRead;
use termion::raw::IntoRawMode;
use termion::screen::AlternateScreen;
use tokio::runtime::{self, Runtime};

use threadline::compose::{Resolution, Target};
use threadline::identity::{Identity, IdentityStore};
use threadline::url::Url;
use threadline::vote::Vote;
use threadline::{Client, Config, NodeId, ThreadSession};

use threadline_cli::{
    app::State,
    error::Error,
    render::{self, Context},
    text::Fancy,
    theme::{Theme, UiTheme},
    util,
};

#[derive(Debug, StructOpt)]
enum Command {
    /// Remember the username to comment and vote as
    #[structopt(name = "login")]
    Login { username: String },
    /// Forget the stored username
    #[structopt(name = "logout")]
    Logout,
    /// Browse a thread and vote on it interactively
    #[structopt(name = "thread")]
    Thread { thread_id: NodeId },
    /// Post a top-level comment to a thread
    #[structopt(name = "comment")]
    Comment { thread_id: NodeId, text: String },
    /// Reply to a comment or reply
    #[structopt(name = "reply")]
    Reply {
        thread_id: NodeId,
        parent_id: NodeId,
        text: String,
    },
}

#[derive(Debug, StructOpt)]
struct App {
    /// Base URL of the discussion API
    #[structopt(
        short = "b",
        long = "base-url",
        env = "THREADLINE_URL",
        default_value = threadline::URL,
        parse(try_from_str = util::parse_url)
    )]
    base_url: Url,

    /// Seconds to wait for a reply to be accepted
    #[structopt(
        short = "t",
        long = "timeout",
        env = "THREADLINE_TIMEOUT",
        default_value = "30",
        parse(try_from_str = util::parse_timeout)
    )]
    timeout: Duration,

    /// Theme to use. Options: true, 256, grey or gray, mono
    #[structopt(long = "theme", default_value = "256")]
    theme: UiTheme,

    #[structopt(subcommand)]
    command: Command,
}

type CommandResult = Result<(), Error>;

fn main() {
    env_logger::init();
    let app = App::from_args();

    let result = run(app);

    match &result {
        Ok(()) => (),
        Err(Error::Threadline(threadline::Error::Http(err))) => {
            eprintln!("HTTP error, caused by: {:?}", err)
        }
        Err(Error::Threadline(threadline::Error::Io(err))) => {
            eprintln!("IO error, caused by: {:?}", err)
        }
        Err(Error::Threadline(threadline::Error::Url(err))) => eprintln!("Invalid URL: {:?}", err),
        Err(Error::Threadline(threadline::Error::Unauthenticated)) => {
            eprintln!("Error: Not logged in. Run `threadline login <username>` first")
        }
        Err(Error::Threadline(threadline::Error::Submission(failure))) => {
            eprintln!("Reply was not posted: {}", failure)
        }
        Err(Error::Threadline(err)) => eprintln!("Error: {}", err),
        Err(Error::NotATty) => eprintln!("Error: The thread view needs a terminal"),
    }

    if result.is_err() {
        std::process::exit(1);
    }
}

fn run(app: App) -> CommandResult {
    let store = IdentityStore::open_default()?;

    let (thread_id, reply) = match app.command {
        Command::Login { username } => return login(&store, &username),
        Command::Logout => return logout(&store),
        Command::Thread { thread_id } => (thread_id, None),
        Command::Comment { thread_id, text } => (thread_id, Some((Target::Thread, text))),
        Command::Reply {
            thread_id,
            parent_id,
            text,
        } => (thread_id, Some((Target::Reply(parent_id), text))),
    };

    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
    let config = Config::new(app.base_url).with_timeout(app.timeout);
    let client = Client::new(&config)?;
    let identity = store.load()?;
    let session =
        ThreadSession::new(client, thread_id, identity).with_timeout(config.request_timeout);
    let theme = app.theme.theme();

    match reply {
        Some((target, text)) => post(&rt, session, target, text, theme),
        None => thread(&rt, session, theme),
    }
}

fn login(store: &IdentityStore, username: &str) -> CommandResult {
    let identity = Identity::new(username)?;
    store.save(&identity)?;
    info!("identity saved to {}", store.path().display());
    println!("Logged in as {}", identity.username());
    Ok(())
}

fn logout(store: &IdentityStore) -> CommandResult {
    store.clear()?;
    println!("Logged out");
    Ok(())
}

fn post(
    rt: &Runtime,
    mut session: ThreadSession<Client>,
    target: Target,
    text: String,
    theme: &Theme,
) -> CommandResult {
    rt.block_on(session.load())?;
    session.open(target.clone())?;
    session.edit(&target, text)?;

    match rt.block_on(session.submit(&target))? {
        Resolution::Refetch(_) => (),
        Resolution::Failed(_, failure) => return Err(threadline::Error::from(failure).into()),
        Resolution::Ignored => return Ok(()),
    }

    if session.is_stale() {
        println!("Reply posted, but the thread could not be reloaded. Run `threadline thread` to see it");
        return Ok(());
    }

    let discussion = match session.discussion() {
        Some(discussion) => discussion,
        None => return Ok(()),
    };
    let state = State::new(discussion);
    let ctx = Context {
        discussion,
        votes: |id: &NodeId| session.vote_state(id),
        theme,
        now: Utc::now(),
    };
    let lines = render::render_nodes(&state, &ctx, None);

    let stdout = stdout();
    let mut out = stdout.lock();
    render::print_lines(&lines, &mut out)
}

fn thread(rt: &Runtime, mut session: ThreadSession<Client>, theme: &Theme) -> CommandResult {
    if !termion::is_tty(&stdout()) {
        return Err(Error::NotATty);
    }

    print!("Loading...");
    stdout().flush()?;
    let mut state = State::new(rt.block_on(session.load())?);
    println!(" done.");

    let screen = AlternateScreen::from(stdout());
    let mut screen = screen.into_raw_mode()?;
    write!(screen, "{}", cursor::Hide)?;
    let stdin = stdin();

    draw(&mut screen, &mut state, &session, theme)?;

    for key in stdin.keys() {
        let redraw = match key? {
            Key::Char('q') | Key::Esc => break,
            Key::Char('j') | Key::Down => state.next_node(),
            Key::Char('k') | Key::Up => state.prev_node(),
            Key::Char('h') => state.scroll_left(10),
            Key::Char('l') => state.scroll_right(10),
            Key::Char(c @ 'u') | Key::Char(c @ 'd') => {
                let direction = if c == 'u' { Vote::Up } else { Vote::Down };
                match session.toggle_vote(state.current_vote_node(), direction) {
                    Ok(_) => state.clear_status(),
                    Err(err) => state.set_status(err.to_string()),
                }
                true
            }
            Key::Char('r') => {
                state.set_status("Refreshing...");
                draw(&mut screen, &mut state, &session, theme)?;
                match rt.block_on(session.refresh()) {
                    Ok(discussion) => {
                        state.refresh(discussion);
                        state.clear_status();
                    }
                    Err(err) => state.set_status(err.to_string()),
                }
                true
            }
            _ => false,
        };

        if redraw {
            draw(&mut screen, &mut state, &session, theme)?;
        }
    }

    write!(screen, "{}", cursor::Show)?;
    screen.flush()?;

    Ok(())
}

/// Draw the thread, keeping the bottom row for the status message
fn draw<W: Write>(
    screen: &mut W,
    state: &mut State,
    session: &ThreadSession<Client>,
    theme: &Theme,
) -> CommandResult {
    let discussion = match session.discussion() {
        Some(discussion) => discussion,
        None => return Ok(()),
    };
    let (width, height) = util::as_usize(termion::terminal_size()?);

    let ctx = Context {
        discussion,
        votes: |id: &NodeId| session.vote_state(id),
        theme,
        now: Utc::now(),
    };
    let mut lines = render::render_thread(state, &ctx, height.saturating_sub(1));
    lines.resize_with(height.saturating_sub(1), Vec::new);
    let status = state
        .status()
        .unwrap_or("j/k move  u/d vote  r refresh  q quit");
    lines.push(vec![Fancy::new(status).fg(theme.status)]);

    render::render_lines(&lines, screen, state.col_offset(), width)
}
