use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use uuid::Uuid;

use dayplan_core::auth::{
    validate_sign_in, validate_sign_up, AuthError, AuthFailureKind, AuthMessage, AuthProvider,
    Session,
};
use dayplan_core::model::schedule::NO_TASKS_MESSAGE;
use dayplan_core::{
    parse_new_task, parse_task_patch, DayPlanner, GenerateOutcome, MemoryTaskRepository,
    ScheduleRequester, StoreEvent, Task,
};

use crate::tui::theme::Theme;

/// Minutes added or removed by `+` / `-`.
pub const ESTIMATE_STEP: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Planner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    Modifying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Single-line text field. The cursor counts chars, not bytes.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, value: String) {
        self.cursor = value.chars().count();
        self.value = value;
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor);
        self.value.insert(byte_index, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let byte_index = self.byte_index(self.cursor - 1);
            self.value.remove(byte_index);
            self.cursor -= 1;
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn masked(&self) -> String {
        "*".repeat(self.value.chars().count())
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.value.chars().take(chars).map(|c| c.len_utf8()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub tab: AuthTab,
    pub field: LoginField,
    pub email: TextInput,
    pub password: TextInput,
    pub confirm: TextInput,
    /// Title and description of the last failure.
    pub error: Option<(String, String)>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            tab: AuthTab::SignIn,
            field: LoginField::Email,
            email: TextInput::default(),
            password: TextInput::default(),
            confirm: TextInput::default(),
            error: None,
        }
    }
}

impl LoginForm {
    pub fn fields(&self) -> &'static [LoginField] {
        match self.tab {
            AuthTab::SignIn => &[LoginField::Email, LoginField::Password],
            AuthTab::SignUp => &[LoginField::Email, LoginField::Password, LoginField::Confirm],
        }
    }

    pub fn switch_tab(&mut self) {
        self.tab = match self.tab {
            AuthTab::SignIn => AuthTab::SignUp,
            AuthTab::SignUp => AuthTab::SignIn,
        };
        self.field = LoginField::Email;
        self.confirm.clear();
        self.error = None;
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(i + 1) % fields.len()];
    }

    pub fn previous_field(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(i + fields.len() - 1) % fields.len()];
    }

    fn active_input(&mut self) -> &mut TextInput {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
            LoginField::Confirm => &mut self.confirm,
        }
    }
}

enum AuthRequest {
    Anonymous,
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
}

struct PendingAuth {
    rx: oneshot::Receiver<Result<Session, AuthError>>,
    join: JoinHandle<()>,
}

impl Drop for PendingAuth {
    fn drop(&mut self) {
        self.join.abort();
    }
}

pub struct App {
    pub screen: Screen,
    pub theme: &'static Theme,
    pub login: LoginForm,
    pub session: Option<Session>,
    pub planner: Option<DayPlanner<MemoryTaskRepository>>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input: TextInput,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    auth: Arc<dyn AuthProvider>,
    requester: ScheduleRequester,
    handle: Handle,
    pending_auth: Option<PendingAuth>,
    dirty: Rc<Cell<bool>>,
}

impl App {
    /// Must be called from within a tokio runtime.
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        requester: ScheduleRequester,
        theme: &'static Theme,
    ) -> App {
        App {
            screen: Screen::Login,
            theme,
            login: LoginForm::default(),
            session: None,
            planner: None,
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input: TextInput::default(),
            notice: None,
            should_quit: false,
            auth,
            requester,
            handle: Handle::current(),
            pending_auth: None,
            dirty: Rc::new(Cell::new(true)),
        }
    }

    /// Returns whether anything changed since the last call.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn is_signing_in(&self) -> bool {
        self.pending_auth.is_some()
    }

    pub fn tasks(&self) -> &[Task] {
        self.planner.as_ref().map(|p| p.tasks()).unwrap_or(&[])
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks().get(self.state.selected()?)
    }

    /// Picks up timer ticks and finished background requests.
    pub fn on_tick(&mut self) {
        if let Some(planner) = self.planner.as_mut() {
            if planner.drain_ticks() > 0 {
                self.dirty.set(true);
            }
            if planner.poll_schedule() {
                self.dirty.set(true);
            }
        }
        self.poll_auth();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.dirty.set(true);
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }
        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Planner => match self.input_mode {
                InputMode::Normal => self.handle_planner_key(key),
                InputMode::Adding | InputMode::Modifying => self.handle_input_key(key),
            },
        }
    }

    pub fn quit(&mut self) {
        if let Some(planner) = self.planner.as_mut() {
            planner.shutdown();
        }
        self.pending_auth = None;
        self.should_quit = true;
    }

    // --- login ---

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.start_auth(AuthRequest::Anonymous)
            }
            KeyCode::Esc => self.quit(),
            KeyCode::Tab => self.login.switch_tab(),
            KeyCode::Down => self.login.next_field(),
            KeyCode::Up | KeyCode::BackTab => self.login.previous_field(),
            KeyCode::Enter => self.submit_login(),
            KeyCode::Char(c) => self.login.active_input().insert(c),
            KeyCode::Backspace => self.login.active_input().backspace(),
            KeyCode::Left => self.login.active_input().move_left(),
            KeyCode::Right => self.login.active_input().move_right(),
            _ => {}
        }
    }

    pub fn submit_login(&mut self) {
        let email = self.login.email.value().trim().to_string();
        let password = self.login.password.value().to_string();
        let checked = match self.login.tab {
            AuthTab::SignIn => validate_sign_in(&email, &password),
            AuthTab::SignUp => validate_sign_up(&email, &password, self.login.confirm.value()),
        };
        if let Err(e) = checked {
            self.login.error = Some(("Invalid input".to_string(), e.to_string()));
            return;
        }
        let request = match self.login.tab {
            AuthTab::SignIn => AuthRequest::SignIn { email, password },
            AuthTab::SignUp => AuthRequest::SignUp { email, password },
        };
        self.start_auth(request);
    }

    fn start_auth(&mut self, request: AuthRequest) {
        if self.pending_auth.is_some() {
            return;
        }
        self.login.error = None;
        let kind = match &request {
            AuthRequest::Anonymous => "anonymous",
            AuthRequest::SignIn { .. } => "sign_in",
            AuthRequest::SignUp { .. } => "sign_up",
        };
        tracing::info!(kind, "authentication started");

        let (tx, rx) = oneshot::channel();
        let auth = Arc::clone(&self.auth);
        let join = self.handle.spawn(async move {
            let result = match request {
                AuthRequest::Anonymous => auth.sign_in_anonymously().await,
                AuthRequest::SignIn { email, password } => {
                    auth.sign_in_with_email(&email, &password).await
                }
                AuthRequest::SignUp { email, password } => {
                    auth.sign_up_with_email(&email, &password).await
                }
            };
            let _ = tx.send(result);
        });
        self.pending_auth = Some(PendingAuth { rx, join });
    }

    fn poll_auth(&mut self) {
        let Some(pending) = self.pending_auth.as_mut() else {
            return;
        };
        let message = match pending.rx.try_recv() {
            Err(TryRecvError::Empty) => return,
            Ok(Ok(session)) => {
                self.pending_auth = None;
                self.on_signed_in(session);
                return;
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "authentication failed");
                AuthMessage::from_error(&e)
            }
            Err(TryRecvError::Closed) => {
                tracing::error!("authentication ended without a result");
                AuthMessage::for_kind(AuthFailureKind::Generic)
            }
        };
        self.pending_auth = None;
        self.login.error = Some((message.title.to_string(), message.description.to_string()));
        self.dirty.set(true);
    }

    fn on_signed_in(&mut self, session: Session) {
        tracing::info!(
            user_id = %session.user_id,
            anonymous = session.anonymous,
            "signed in"
        );
        let mut planner = DayPlanner::new(MemoryTaskRepository::new(), self.requester.clone());
        let dirty = Rc::clone(&self.dirty);
        planner.subscribe(Box::new(move |_: &StoreEvent| dirty.set(true)));

        self.notice = Some(Notice::Info(format!("Signed in as {}", session.display_name())));
        self.planner = Some(planner);
        self.session = Some(session);
        self.login = LoginForm::default();
        self.state.select(None);
        self.input_mode = InputMode::Normal;
        self.screen = Screen::Planner;
        self.dirty.set(true);
    }

    pub fn sign_out(&mut self) {
        if let Some(mut planner) = self.planner.take() {
            planner.shutdown();
        }
        if let Some(session) = self.session.take() {
            let auth = Arc::clone(&self.auth);
            self.handle.spawn(async move {
                if let Err(e) = auth.sign_out(&session).await {
                    tracing::warn!(error = %e, "sign-out failed");
                }
            });
        }
        tracing::info!("signed out");
        self.state.select(None);
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.notice = None;
        self.screen = Screen::Login;
    }

    // --- planner ---

    fn handle_planner_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_complete(),
            KeyCode::Char('s') => self.toggle_running(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_task(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_estimate(ESTIMATE_STEP),
            KeyCode::Char('-') => self.adjust_estimate(-ESTIMATE_STEP),
            KeyCode::Char('r') => self.reset_time(),
            KeyCode::Char('g') => self.generate_schedule(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('L') => self.sign_out(),
            KeyCode::Char('a') => self.enter_add_mode(),
            KeyCode::Char('m') => self.enter_modify_mode(),
            KeyCode::Esc => self.notice = None,
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_command(),
            KeyCode::Esc => self.exit_input_mode(),
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            _ => {}
        }
    }

    fn selected_id(&self) -> Option<Uuid> {
        self.selected_task().map(|t| t.id)
    }

    fn with_selected(&mut self, f: impl FnOnce(&mut DayPlanner<MemoryTaskRepository>, &Uuid)) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Some(planner) = self.planner.as_mut() {
            f(planner, &id);
        }
    }

    pub fn next(&mut self) {
        let len = self.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_complete(&mut self) {
        self.with_selected(|planner, id| planner.toggle_complete(id));
    }

    pub fn toggle_running(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        if task.is_complete {
            self.notice = Some(Notice::Info("Completed tasks can't be timed.".to_string()));
            return;
        }
        self.with_selected(|planner, id| {
            planner.toggle_running(id);
        });
    }

    pub fn delete_task(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        self.with_selected(|planner, id| planner.delete_task(id));

        let len = self.tasks().len();
        if len == 0 {
            self.state.select(None);
        } else if i >= len {
            self.state.select(Some(len - 1));
        }
    }

    pub fn adjust_estimate(&mut self, delta_minutes: i64) {
        self.with_selected(|planner, id| planner.adjust_estimate(id, delta_minutes));
    }

    pub fn reset_time(&mut self) {
        self.with_selected(|planner, id| planner.reset_time(id));
    }

    pub fn generate_schedule(&mut self) {
        let Some(planner) = self.planner.as_mut() else {
            return;
        };
        self.notice = match planner.generate_schedule() {
            GenerateOutcome::Started => None,
            GenerateOutcome::InFlight => Some(Notice::Info(
                "A schedule is already being generated.".to_string(),
            )),
            GenerateOutcome::NoTasks => Some(Notice::Info(NO_TASKS_MESSAGE.to_string())),
        };
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.input.clear();
        self.notice = None;
    }

    /// Prefills the input with the selected task so single fields can be
    /// edited in place.
    pub fn enter_modify_mode(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let line = format!(
            "{} est:{} pri:{}",
            task.name,
            task.estimated_duration,
            task.priority.label().to_lowercase()
        );
        self.input.set(line);
        self.input_mode = InputMode::Modifying;
        self.notice = None;
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    /// Invalid input keeps the prompt open with the error in the status line.
    pub fn submit_command(&mut self) {
        if self.input.value().trim().is_empty() {
            self.exit_input_mode();
            return;
        }

        let submitted = match self.input_mode {
            InputMode::Adding => self.submit_add(),
            InputMode::Modifying => self.submit_modify(),
            InputMode::Normal => Ok(()),
        };

        match submitted {
            Ok(()) => {
                self.notice = None;
                self.exit_input_mode();
            }
            Err(e) => self.notice = Some(Notice::Error(e.to_string())),
        }
    }

    fn submit_add(&mut self) -> anyhow::Result<()> {
        let new_task = parse_new_task(self.input.value())?;
        if let Some(planner) = self.planner.as_mut() {
            planner.add_task(new_task);
            self.state.select(Some(0));
        }
        Ok(())
    }

    fn submit_modify(&mut self) -> anyhow::Result<()> {
        let patch = parse_task_patch(self.input.value())?;
        self.with_selected(|planner, id| planner.update_task(id, &patch));
        Ok(())
    }
}
