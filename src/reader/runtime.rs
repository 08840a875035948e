use super::messages::Message;
use super::state::ReaderView;
use super::update::Effect;
use crate::book::fetch_chapter;
use crate::services::Navigator;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Drives a [`ReaderView`]: runs its effects and feeds results back in.
///
/// Chapter reads run as spawned tasks, so a runtime must live inside a tokio
/// runtime. Superseded reads are not cancelled; the reducer drops their
/// results by epoch.
pub struct ReaderRuntime<N> {
    view: ReaderView,
    navigator: N,
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
    in_flight: usize,
}

impl<N: Navigator> ReaderRuntime<N> {
    pub fn new(view: ReaderView, navigator: N) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            view,
            navigator,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn view(&self) -> &ReaderView {
        &self.view
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Reduce `message` and start whatever it asks for.
    pub fn dispatch(&mut self, message: Message) {
        if matches!(message, Message::ChapterFetched { .. }) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        for effect in self.view.reduce(message) {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Navigate(path) => self.navigator.push(&path),
            Effect::FetchChapter {
                epoch,
                chapter,
                href,
                archive,
            } => {
                self.in_flight += 1;
                trace!(epoch, chapter, in_flight = self.in_flight, "Spawning chapter fetch");
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let result = fetch_chapter(archive.as_ref(), &href).await;
                    if sender
                        .send(Message::ChapterFetched {
                            epoch,
                            chapter,
                            result,
                        })
                        .is_err()
                    {
                        debug!(epoch, chapter, "Reader runtime gone before chapter arrived");
                    }
                });
            }
        }
    }

    /// Wait for the next async result and dispatch it.
    pub async fn next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Dispatch results until no fetch is outstanding.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            if !self.next().await {
                break;
            }
        }
    }
}
