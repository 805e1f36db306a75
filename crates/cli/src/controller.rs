//! Request controller.
//!
//! Owns the locator cache, the in-flight generation and the generation state.
//! Everything runs on the task that owns the controller: commands, the
//! debounce timer and the in-flight operation are multiplexed in [`RequestController::run`],
//! so a command arriving mid-generation is evaluated immediately and dropped by
//! the in-flight guard instead of queueing behind it.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pixgen_client::{ImageDisplay, ImageSaver, LocatorSource};
use pixgen_core::state::download_file_name;
use pixgen_core::{AppConfig, Error, FifoCache, GenerationState, Prompt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Sleep;

use crate::command::Command;
use crate::render::Renderer;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Controller settings taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Quiet period before typed input triggers a generation (default: 500ms).
    pub debounce: Duration,
    /// Limit on the generation request (default: 12s).
    pub timeout: Duration,
    pub cache_capacity: usize,
    pub download_dir: PathBuf,
}

impl From<&AppConfig> for ControllerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            debounce: config.debounce(),
            timeout: config.timeout(),
            cache_capacity: config.cache_capacity,
            download_dir: config.download_dir.clone(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Result of one phase of the in-flight generation.
enum Step {
    Fetched { prompt: Prompt, result: Result<String, Error> },
    Loaded { locator: String, result: Result<(), Error> },
}

/// Drives prompt → image generation for a single widget.
pub struct RequestController {
    config: ControllerConfig,
    source: Arc<dyn LocatorSource>,
    display: Arc<dyn ImageDisplay>,
    saver: Arc<dyn ImageSaver>,
    renderer: Box<dyn Renderer>,
    cache: FifoCache<Prompt, String>,
    state: GenerationState,
    input: String,
    debounce: Option<Pin<Box<Sleep>>>,
    /// Prompt started by Enter since the last keystroke.
    submitted: Option<Prompt>,
    /// Present exactly while a generation is in flight.
    in_flight: Option<BoxFuture<Step>>,
    displayed: Option<String>,
    saves: JoinSet<()>,
}

impl RequestController {
    pub fn new(
        config: ControllerConfig, source: Arc<dyn LocatorSource>, display: Arc<dyn ImageDisplay>,
        saver: Arc<dyn ImageSaver>, renderer: Box<dyn Renderer>,
    ) -> Self {
        let cache = FifoCache::new(config.cache_capacity);
        Self {
            config,
            source,
            display,
            saver,
            renderer,
            cache,
            state: GenerationState::Idle,
            input: String::new(),
            debounce: None,
            submitted: None,
            in_flight: None,
            displayed: None,
            saves: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn cache(&self) -> &FifoCache<Prompt, String> {
        &self.cache
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Locator of the image currently on display.
    pub fn displayed(&self) -> Option<&str> {
        self.displayed.as_deref()
    }

    /// Apply a user action.
    pub fn dispatch(&mut self, command: Command) {
        tracing::debug!(?command, "dispatch");
        match command {
            Command::InputChanged(text) => self.on_input_changed(&text),
            Command::Submit => self.on_submit(),
            Command::Regenerate => {
                let input = self.input.clone();
                self.regenerate(&input);
            }
            Command::Download => self.download_current(),
            Command::Quit => {}
        }
    }

    /// Record new prompt text and restart the debounce timer.
    pub fn on_input_changed(&mut self, raw: &str) {
        self.input = raw.to_string();
        self.submitted = None;
        self.debounce = Some(Box::pin(tokio::time::sleep(self.config.debounce)));
    }

    /// Generate from the current input right away.
    ///
    /// A pending debounce stays armed: if this submit is dropped by the
    /// in-flight guard, the timer still picks the input up later.
    pub fn on_submit(&mut self) {
        let input = self.input.clone();
        let idle = !self.is_generating();
        self.generate(&input);
        if idle && self.is_generating() {
            self.submitted = Prompt::parse(&input);
        }
    }

    /// Start a generation for `raw` unless one is already running.
    pub fn generate(&mut self, raw: &str) {
        match Prompt::parse(raw) {
            Some(prompt) => self.begin(prompt),
            None => self.fail(Error::PromptTooShort),
        }
    }

    /// Drop any cached locator for `raw` and generate it again.
    pub fn regenerate(&mut self, raw: &str) {
        let Some(prompt) = Prompt::parse(raw) else {
            self.fail(Error::PromptMissing);
            return;
        };

        if self.cache.remove(&prompt).is_some() {
            tracing::debug!(%prompt, "invalidated cached locator");
        }
        self.begin(prompt);
    }

    /// Save the displayed image as `image_<epoch-ms>.png` in the download directory.
    ///
    /// The save runs in the background and does not change the generation state.
    pub fn download_current(&mut self) {
        let Some(locator) = self.displayed.clone() else {
            self.fail(Error::NothingToDownload);
            return;
        };

        while self.saves.try_join_next().is_some() {}

        let destination = self.config.download_dir.join(download_file_name(Utc::now()));
        let saver = Arc::clone(&self.saver);
        self.saves.spawn(async move {
            if let Err(e) = saver.save(&locator, &destination).await {
                tracing::warn!(%locator, path = %destination.display(), "download failed: {e}");
            }
        });
    }

    /// Wait for the next timer or in-flight event and apply it.
    ///
    /// Returns `false` without waiting when nothing is pending.
    pub async fn tick(&mut self) -> bool {
        if self.debounce.is_none() && self.in_flight.is_none() {
            return false;
        }

        tokio::select! {
            () = debounce_elapsed(&mut self.debounce) => self.on_debounce_elapsed(),
            step = next_step(&mut self.in_flight) => self.advance(step),
        }
        true
    }

    /// Process pending timers and the in-flight generation until both are gone.
    pub async fn settle(&mut self) {
        while self.tick().await {}
    }

    /// Wait for background image saves to finish.
    pub async fn wait_for_saves(&mut self) {
        while self.saves.join_next().await.is_some() {}
    }

    /// Serve commands until `Quit` or the channel closes.
    ///
    /// A generation still in flight at shutdown is allowed to settle, and
    /// pending saves are awaited; a pending debounce is discarded.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Self {
        self.renderer.render(&self.state);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Quit) | None => break,
                    Some(command) => self.dispatch(command),
                },
                () = debounce_elapsed(&mut self.debounce) => self.on_debounce_elapsed(),
                step = next_step(&mut self.in_flight) => self.advance(step),
            }
        }

        self.debounce = None;
        self.settle().await;
        self.wait_for_saves().await;
        self
    }

    fn on_debounce_elapsed(&mut self) {
        self.debounce = None;
        let submitted = self.submitted.take();
        match Prompt::parse(&self.input) {
            Some(prompt) if self.is_generating() => {
                tracing::debug!(%prompt, "generation in flight, dropping input");
            }
            Some(prompt) if submitted.as_ref() == Some(&prompt) && self.state.locator().is_some() => {
                tracing::debug!(%prompt, "submitted prompt already displayed");
            }
            Some(prompt) => self.begin(prompt),
            None => self.set_state(GenerationState::Idle),
        }
    }

    fn begin(&mut self, prompt: Prompt) {
        if self.is_generating() {
            tracing::debug!(%prompt, "generation already in flight, ignoring");
            return;
        }

        self.set_state(GenerationState::Loading);

        match self.cache.get(&prompt).cloned() {
            Some(locator) => {
                tracing::debug!(%prompt, %locator, "cache hit");
                self.begin_load(locator);
            }
            None => self.begin_fetch(prompt),
        }
    }

    fn begin_fetch(&mut self, prompt: Prompt) {
        let source = Arc::clone(&self.source);
        let timeout = self.config.timeout;

        self.in_flight = Some(Box::pin(async move {
            let result = match tokio::time::timeout(timeout, source.fetch_locator(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout),
            };
            Step::Fetched { prompt, result }
        }));
    }

    fn begin_load(&mut self, locator: String) {
        let display = Arc::clone(&self.display);

        self.in_flight = Some(Box::pin(async move {
            let result = display.load(&locator).await;
            Step::Loaded { locator, result }
        }));
    }

    fn advance(&mut self, step: Step) {
        self.in_flight = None;

        match step {
            Step::Fetched { prompt, result: Ok(locator) } => {
                if let Some((evicted, _)) = self.cache.insert(prompt.clone(), locator.clone()) {
                    tracing::debug!(%evicted, "evicted oldest cache entry");
                }
                tracing::debug!(%prompt, %locator, "cached locator");
                self.begin_load(locator);
            }
            Step::Loaded { locator, result: Ok(()) } => {
                self.displayed = Some(locator.clone());
                self.set_state(GenerationState::Success(locator));
                self.renderer.reveal();
            }
            Step::Fetched { result: Err(err), .. } | Step::Loaded { result: Err(err), .. } => self.fail(err),
        }
    }

    fn fail(&mut self, err: Error) {
        if !err.is_validation() {
            tracing::warn!("generation failed: {err}");
        }
        self.set_state(GenerationState::Error(err.user_message()));
    }

    fn set_state(&mut self, state: GenerationState) {
        tracing::info!(from = self.state.name(), to = state.name(), "state change");
        self.state = state;
        self.renderer.render(&self.state);
    }
}

async fn debounce_elapsed(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_step(in_flight: &mut Option<BoxFuture<Step>>) -> Step {
    match in_flight {
        Some(step) => step.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::Mutex;

    use pixgen_client::GenerationRequest;
    use tokio::time::Instant;

    #[derive(Clone, Copy)]
    enum Reply {
        Locator,
        Fail(u16),
        Hang,
        After(Duration),
    }

    /// Records the query each fetch would send.
    struct FakeSource {
        reply: Reply,
        queries: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self { reply, queries: Mutex::new(Vec::new()) })
        }

        fn calls(&self) -> usize {
            self.queries.lock().unwrap().len()
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LocatorSource for FakeSource {
        async fn fetch_locator(&self, prompt: &Prompt) -> Result<String, Error> {
            let query = GenerationRequest::new(prompt, true, "square", Utc::now()).query();
            self.queries.lock().unwrap().push(query);

            let locator = format!("https://img.test/{}.png", prompt.as_str().replace(' ', "_"));
            match self.reply {
                Reply::Locator => Ok(locator),
                Reply::Fail(status) => Err(Error::Api { status }),
                Reply::Hang => std::future::pending().await,
                Reply::After(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(locator)
                }
            }
        }
    }

    #[derive(Default)]
    struct FakeDisplay {
        fail: bool,
        loads: Mutex<Vec<String>>,
        saves: Mutex<Vec<(String, PathBuf)>>,
    }

    #[async_trait::async_trait]
    impl ImageDisplay for FakeDisplay {
        async fn load(&self, locator: &str) -> Result<(), Error> {
            self.loads.lock().unwrap().push(locator.to_string());
            if self.fail { Err(Error::DisplayLoad) } else { Ok(()) }
        }
    }

    #[async_trait::async_trait]
    impl ImageSaver for FakeDisplay {
        async fn save(&self, locator: &str, destination: &Path) -> Result<(), Error> {
            self.saves.lock().unwrap().push((locator.to_string(), destination.to_path_buf()));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingRenderer {
        states: Arc<Mutex<Vec<GenerationState>>>,
        reveals: Arc<Mutex<usize>>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, state: &GenerationState) {
            self.states.lock().unwrap().push(state.clone());
        }

        fn reveal(&mut self) {
            *self.reveals.lock().unwrap() += 1;
        }
    }

    struct Harness {
        controller: RequestController,
        source: Arc<FakeSource>,
        display: Arc<FakeDisplay>,
        renderer: RecordingRenderer,
    }

    fn harness_with(reply: Reply, display: FakeDisplay) -> Harness {
        let source = FakeSource::new(reply);
        let display = Arc::new(display);
        let renderer = RecordingRenderer::default();
        let config = ControllerConfig { download_dir: PathBuf::from("/tmp/pixgen"), ..Default::default() };
        let controller =
            RequestController::new(config, source.clone(), display.clone(), display.clone(), Box::new(renderer.clone()));
        Harness { controller, source, display, renderer }
    }

    fn harness(reply: Reply) -> Harness {
        harness_with(reply, FakeDisplay::default())
    }

    fn error(message: &str) -> GenerationState {
        GenerationState::Error(message.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_prompt_errors_without_request() {
        for raw in ["", "  ", "hi", " ab ", "\tx\n"] {
            let mut h = harness(Reply::Locator);
            h.controller.generate(raw);
            h.controller.settle().await;

            assert_eq!(h.controller.state(), &error("Prompt must be at least 3 characters"));
            assert_eq!(h.source.calls(), 0);
            assert!(!h.controller.is_generating());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_input_generates_once() {
        let mut h = harness(Reply::Locator);
        let start = Instant::now();

        h.controller.on_input_changed("sunset beach");
        assert!(tokio::time::timeout(Duration::from_millis(499), h.controller.tick()).await.is_err());
        assert_eq!(h.source.calls(), 0);

        h.controller.settle().await;

        assert!(start.elapsed() >= Duration::from_millis(500));
        let queries = h.source.queries();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].starts_with("prompt=sunset%20beach&improve=true&format=square&random="));
        assert_eq!(h.controller.state(), &GenerationState::Success("https://img.test/sunset_beach.png".into()));
        assert!(h.controller.cache().contains(&Prompt::parse("sunset beach").unwrap()));
        assert_eq!(*h.display.loads.lock().unwrap(), vec!["https://img.test/sunset_beach.png".to_string()]);
        assert_eq!(
            *h.renderer.states.lock().unwrap(),
            vec![GenerationState::Loading, GenerationState::Success("https://img.test/sunset_beach.png".into())]
        );
        assert_eq!(*h.renderer.reveals.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_keystroke_restarts_debounce() {
        let mut h = harness(Reply::Locator);
        let start = Instant::now();

        h.controller.on_input_changed("sun");
        assert!(tokio::time::timeout(Duration::from_millis(300), h.controller.tick()).await.is_err());
        h.controller.on_input_changed("sunset");
        h.controller.settle().await;

        assert!(start.elapsed() >= Duration::from_millis(800));
        assert_eq!(h.source.calls(), 1);
        assert!(h.source.queries()[0].starts_with("prompt=sunset&"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_goes_idle_but_generate_errors() {
        let mut h = harness(Reply::Locator);

        h.controller.generate("hi");
        assert_eq!(h.controller.state(), &error("Prompt must be at least 3 characters"));

        h.controller.on_input_changed("hi");
        h.controller.settle().await;

        assert_eq!(h.controller.state(), &GenerationState::Idle);
        assert_eq!(h.source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_generate_while_in_flight_is_ignored() {
        let mut h = harness(Reply::After(Duration::from_secs(1)));

        h.controller.generate("cat");
        h.controller.generate("cat");
        h.controller.generate("dog");
        assert!(h.controller.is_generating());
        h.controller.settle().await;

        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.controller.state(), &GenerationState::Success("https://img.test/cat.png".into()));
        assert!(!h.controller.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_during_generation_is_dropped() {
        let mut h = harness(Reply::After(Duration::from_secs(1)));

        h.controller.generate("cat");
        h.controller.on_input_changed("dog");
        h.controller.settle().await;

        assert_eq!(h.source.calls(), 1);
        assert!(h.source.queries()[0].starts_with("prompt=cat&"));
        assert!(!h.controller.cache().contains(&Prompt::parse("dog").unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_bypasses_debounce() {
        let mut h = harness(Reply::Locator);
        let start = Instant::now();

        h.controller.on_input_changed("lighthouse");
        h.controller.on_submit();
        assert_eq!(h.controller.state(), &GenerationState::Loading);
        while h.controller.is_generating() {
            h.controller.tick().await;
        }

        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(h.source.calls(), 1);
        assert!(matches!(h.controller.state(), GenerationState::Success(_)));

        // the debounce still fires, but does not reload the same image
        h.controller.settle().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.display.loads.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_during_generation_keeps_debounce() {
        let mut h = harness(Reply::After(Duration::from_millis(200)));

        h.controller.generate("cat");
        h.controller.on_input_changed("cat on a mat");
        h.controller.on_submit();
        h.controller.settle().await;

        let queries = h.source.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].starts_with("prompt=cat&"));
        assert!(queries[1].starts_with("prompt=cat%20on%20a%20mat&"));
        assert_eq!(h.controller.state(), &GenerationState::Success("https://img.test/cat_on_a_mat.png".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_retries_failed_submit() {
        let mut h = harness_with(Reply::Locator, FakeDisplay { fail: true, ..Default::default() });

        h.controller.on_input_changed("cat");
        h.controller.on_submit();
        h.controller.settle().await;

        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.display.loads.lock().unwrap().len(), 2);
        assert_eq!(h.controller.state(), &error("Image failed to load"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_request() {
        let mut h = harness(Reply::Locator);

        h.controller.generate("cat");
        h.controller.settle().await;
        h.controller.generate("  cat ");
        h.controller.settle().await;

        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.display.loads.lock().unwrap().len(), 2);
        assert!(matches!(h.controller.state(), GenerationState::Success(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_evicts_first_inserted() {
        let mut h = harness(Reply::Locator);

        for i in 0..6 {
            h.controller.generate(&format!("prompt {i}"));
            h.controller.settle().await;
        }
        // hits do not refresh recency
        h.controller.generate("prompt 1");
        h.controller.settle().await;
        assert_eq!(h.source.calls(), 6);

        let keys: Vec<_> = h.controller.cache().keys().map(|p| p.as_str().to_string()).collect();
        assert_eq!(keys, vec!["prompt 1", "prompt 2", "prompt 3", "prompt 4", "prompt 5"]);

        h.controller.generate("prompt 0");
        h.controller.settle().await;
        assert_eq!(h.source.calls(), 7);
        assert!(!h.controller.cache().contains(&Prompt::parse("prompt 1").unwrap()));
        assert_eq!(h.controller.cache().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerate_forces_fresh_request() {
        let mut h = harness(Reply::Locator);

        h.controller.generate("cat");
        h.controller.settle().await;
        h.controller.regenerate("cat");
        h.controller.settle().await;

        assert_eq!(h.source.calls(), 2);
        assert!(h.controller.cache().contains(&Prompt::parse("cat").unwrap()));
        assert!(matches!(h.controller.state(), GenerationState::Success(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerate_without_prompt() {
        let mut h = harness(Reply::Locator);
        h.controller.regenerate(" x ");
        assert_eq!(h.controller.state(), &error("Please enter a prompt"));
        assert_eq!(h.source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerate_respects_in_flight_guard() {
        let mut h = harness(Reply::After(Duration::from_secs(1)));

        h.controller.generate("cat");
        h.controller.regenerate("dog");
        h.controller.settle().await;

        assert_eq!(h.source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let mut h = harness(Reply::Hang);
        let start = Instant::now();

        h.controller.generate("cat");
        h.controller.settle().await;

        assert!(start.elapsed() >= Duration::from_millis(12_000));
        assert_eq!(h.controller.state(), &error("Request timed out"));
        assert!(!h.controller.is_generating());
        assert!(h.controller.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_api_error() {
        let mut h = harness(Reply::Fail(500));

        h.controller.generate("cat");
        h.controller.settle().await;

        assert_eq!(h.controller.state(), &error("API Error: 500"));
        assert!(!h.controller.is_generating());
        assert!(h.controller.cache().is_empty());
        assert!(h.display.loads.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_failure_keeps_cache_entry() {
        let mut h = harness_with(Reply::Locator, FakeDisplay { fail: true, ..Default::default() });

        h.controller.generate("cat");
        h.controller.settle().await;

        assert_eq!(h.controller.state(), &error("Image failed to load"));
        assert!(h.controller.cache().contains(&Prompt::parse("cat").unwrap()));
        assert!(h.controller.displayed().is_none());
        assert_eq!(*h.renderer.reveals.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_without_image() {
        let mut h = harness(Reply::Locator);

        h.controller.download_current();
        h.controller.wait_for_saves().await;

        assert_eq!(h.controller.state(), &error("No image to download"));
        assert!(h.display.saves.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_saves_displayed_image() {
        let mut h = harness(Reply::Locator);

        h.controller.generate("cat");
        h.controller.settle().await;
        h.controller.download_current();
        h.controller.wait_for_saves().await;

        let saves = h.display.saves.lock().unwrap().clone();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "https://img.test/cat.png");
        assert_eq!(saves[0].1.parent(), Some(Path::new("/tmp/pixgen")));
        let name = saves[0].1.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("image_") && name.ends_with(".png"));
        assert!(matches!(h.controller.state(), GenerationState::Success(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_dispatches_commands() {
        let h = harness(Reply::After(Duration::from_millis(100)));
        let (tx, rx) = mpsc::channel(8);

        tx.send(Command::InputChanged("sunset beach".into())).await.unwrap();
        tx.send(Command::Submit).await.unwrap();
        tx.send(Command::Submit).await.unwrap();
        tx.send(Command::Quit).await.unwrap();

        let controller = h.controller.run(rx).await;

        assert_eq!(h.source.calls(), 1);
        assert_eq!(controller.state(), &GenerationState::Success("https://img.test/sunset_beach.png".into()));
        assert_eq!(h.renderer.states.lock().unwrap().first(), Some(&GenerationState::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_regenerate_and_download() {
        let h = harness(Reply::Locator);
        let display = h.display.clone();
        let source = h.source.clone();
        let (tx, rx) = mpsc::channel(8);
        let run = tokio::spawn(h.controller.run(rx));

        tx.send(Command::InputChanged("red fox".into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;
        tx.send(Command::Regenerate).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send(Command::Download).await.unwrap();
        drop(tx);

        let controller = run.await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(display.saves.lock().unwrap().len(), 1);
        assert!(matches!(controller.state(), GenerationState::Success(_)));
    }
}
