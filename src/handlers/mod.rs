use log::{error, info};
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::PollApi;
use crate::app::{ClientState, Command, Msg, update};
use crate::render::render;

// Where rendered markup ends up
pub trait Screen: Send {
    fn draw(&mut self, markup: &str) -> io::Result<()>;
}

impl<S: Screen + ?Sized> Screen for Box<S> {
    fn draw(&mut self, markup: &str) -> io::Result<()> {
        (**self).draw(markup)
    }
}

pub struct StdoutScreen;

impl Screen for StdoutScreen {
    fn draw(&mut self, markup: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", markup)?;
        out.flush()
    }
}

// Overwrites a file on every render so a browser or viewer can pick it up
pub struct FileScreen {
    path: PathBuf,
}

impl FileScreen {
    pub fn new(path: PathBuf) -> Self {
        info!("Rendering views to {}", path.display());
        Self { path }
    }
}

impl Screen for FileScreen {
    fn draw(&mut self, markup: &str) -> io::Result<()> {
        std::fs::write(&self.path, markup)
    }
}

// Sole owner of ClientState; requests run as spawned tasks and report back as messages
pub struct EventLoop<A: PollApi, S: Screen> {
    api: Arc<A>,
    screen: S,
    state: ClientState,
    tx: UnboundedSender<Msg>,
    rx: UnboundedReceiver<Msg>,
}

impl<A: PollApi, S: Screen> EventLoop<A, S> {
    pub fn new(api: Arc<A>, screen: S, state: ClientState) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            screen,
            state,
            tx,
            rx,
        }
    }

    pub fn sender(&self) -> UnboundedSender<Msg> {
        self.tx.clone()
    }

    #[cfg(test)]
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub async fn run(mut self) {
        info!("Event loop started");
        let mut running = self.dispatch(Msg::Start);
        while running {
            match self.rx.recv().await {
                Some(msg) => running = self.dispatch(msg),
                None => break,
            }
        }
        info!("Event loop stopped");
    }

    #[cfg(test)]
    pub async fn next_message(&mut self) -> Option<Msg> {
        self.rx.recv().await
    }

    // Apply one message; returns false once shutdown has been requested
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        let mut needs_render = false;
        let mut running = true;

        for command in update(&mut self.state, msg) {
            match command {
                Command::Render => needs_render = true,
                Command::Shutdown => running = false,
                other => self.execute(other),
            }
        }

        if needs_render {
            let markup = render(&self.state);
            if let Err(e) = self.screen.draw(&markup) {
                error!("Failed to draw view: {}", e);
            }
        }
        running
    }

    fn execute(&self, command: Command) {
        match command {
            Command::LoadPolls => {
                self.spawn_request(|api| async move { Msg::PollsLoaded(api.list_polls().await) })
            }
            Command::FetchPoll(id) => {
                self.spawn_request(move |api| async move { Msg::PollOpened(id, api.get_poll(id).await) })
            }
            Command::CreatePoll(new_poll) => self.spawn_request(move |api| async move {
                Msg::PollCreated(api.create_poll(&new_poll).await)
            }),
            Command::DeletePoll(id) => {
                self.spawn_request(move |api| async move { Msg::PollDeleted(id, api.delete_poll(id).await) })
            }
            Command::Vote { poll_id, option_index } => self.spawn_request(move |api| async move {
                Msg::VoteSettled(poll_id, api.vote(poll_id, option_index).await)
            }),
            Command::FetchStats(id) => {
                self.spawn_request(move |api| async move { Msg::StatsLoaded(id, api.poll_stats(id).await) })
            }
            Command::SeedSamples => {
                self.spawn_request(|api| async move { Msg::SamplesSeeded(api.seed_samples().await) })
            }
            Command::DismissNotification { id, after } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Msg::DismissNotification(id));
                });
            }
            Command::Render | Command::Shutdown => {}
        }
    }

    fn spawn_request<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<A>) -> Fut,
        Fut: Future<Output = Msg> + Send + 'static,
    {
        let fut = request(Arc::clone(&self.api));
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }
}
