//! Contact form submission.
//!
//! A [`SubmitContact`] message posts the form's fields once, as multipart
//! form data, to [`ContactForm::endpoint`]. The request runs on the IO task
//! pool; [`finish_contact_submissions`] polls it and shows the localized
//! outcome. There is no retry: after an error the fields are left as typed
//! so the visitor can submit again.

use std::fmt;
use std::sync::Arc;

use bevy::input::keyboard::{ Key, KeyboardInput };
use bevy::prelude::*;
use bevy::tasks::{ block_on, futures_lite::future, IoTaskPool, Task };
use reqwest::header::ACCEPT;

use crate::catalog::I18n;

const STATUS_NEUTRAL: Color = Color::srgb(0.35, 0.37, 0.42);
const STATUS_SUCCESS: Color = Color::srgb(0.13, 0.55, 0.27);
const STATUS_ERROR: Color = Color::srgb(0.75, 0.16, 0.16);

#[derive(Debug)]
pub enum TransportError {
    Http(reqwest::Error),
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "request failed: {e}"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Other(_) => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Sends one form submission and reports the HTTP status it got back.
pub trait ContactTransport: Send + Sync + 'static {
    fn post(&self, endpoint: &str, fields: &[(String, String)]) -> Result<u16, TransportError>;
}

/// Multipart POST with `Accept: application/json`. The body of the answer
/// is never read.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactTransport for HttpTransport {
    fn post(&self, endpoint: &str, fields: &[(String, String)]) -> Result<u16, TransportError> {
        let form = fields
            .iter()
            .fold(reqwest::blocking::multipart::Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            });

        let response = self.client
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()?;
        Ok(response.status().as_u16())
    }
}

#[derive(Resource, Clone)]
pub struct ContactClient(pub Arc<dyn ContactTransport>);

impl ContactClient {
    pub fn new(transport: impl ContactTransport) -> Self {
        Self(Arc::new(transport))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered(u16),
    Rejected(u16),
    Failed,
}

impl SubmitOutcome {
    pub fn from_response(response: &Result<u16, TransportError>) -> Self {
        match response {
            Ok(status) if (200..300).contains(status) => Self::Delivered(*status),
            Ok(status) => Self::Rejected(*status),
            Err(_) => Self::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Form element: where it posts and which entity shows its status.
#[derive(Component, Debug, Clone)]
pub struct ContactForm {
    pub endpoint: String,
    pub status: Entity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checkbox(bool),
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub form: Entity,
    pub name: String,
    pub value: FieldValue,
}

impl FormField {
    pub fn text(form: Entity, name: impl Into<String>) -> Self {
        Self { form, name: name.into(), value: FieldValue::Text(String::new()) }
    }

    pub fn checkbox(form: Entity, name: impl Into<String>) -> Self {
        Self { form, name: name.into(), value: FieldValue::Checkbox(false) }
    }

    /// Name/value pair as a browser would submit it. Unchecked boxes are
    /// left out, checked ones send `on`.
    pub fn entry(&self) -> Option<(String, String)> {
        match &self.value {
            FieldValue::Text(value) => Some((self.name.clone(), value.clone())),
            FieldValue::Checkbox(true) => Some((self.name.clone(), "on".to_string())),
            FieldValue::Checkbox(false) => None,
        }
    }

    pub fn reset(&mut self) {
        self.value = match self.value {
            FieldValue::Text(_) => FieldValue::Text(String::new()),
            FieldValue::Checkbox(_) => FieldValue::Checkbox(false),
        };
    }

    fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(value) => value.clone(),
            FieldValue::Checkbox(true) => "[x]".to_string(),
            FieldValue::Checkbox(false) => "[ ]".to_string(),
        }
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct SubmitButton {
    pub form: Entity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusClass {
    #[default]
    Neutral,
    Success,
    Error,
}

/// Status line of a form. Pair it with a `Text`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub class: StatusClass,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitContact(pub Entity);

/// In-flight request of a form, with the locale captured at submission.
#[derive(Component)]
pub struct PendingSubmission {
    task: Task<Result<u16, TransportError>>,
    lang: String,
}

/// Text field receiving keyboard input.
#[derive(Resource, Debug, Default)]
pub struct FocusedField(pub Option<Entity>);

pub struct ContactPlugin;

impl Plugin for ContactPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SubmitContact>()
            .add_message::<KeyboardInput>()
            .init_resource::<FocusedField>()
            .add_systems(
                Update,
                (
                    (field_clicks, type_into_focused_field).chain(),
                    (submit_button_clicks, start_contact_submissions, finish_contact_submissions).chain(),
                    (show_field_values, paint_form_status),
                ).chain()
            );
    }
}

pub fn submit_button_clicks(
    buttons: Query<(&Interaction, &SubmitButton), Changed<Interaction>>,
    mut submissions: MessageWriter<SubmitContact>
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed {
            submissions.write(SubmitContact(button.form));
        }
    }
}

pub fn field_clicks(
    mut fields: Query<(Entity, &Interaction, &mut FormField), Changed<Interaction>>,
    mut focused: ResMut<FocusedField>
) {
    for (entity, interaction, mut field) in &mut fields {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match &mut field.value {
            FieldValue::Checkbox(checked) => {
                *checked = !*checked;
            }
            FieldValue::Text(_) => {
                focused.0 = Some(entity);
            }
        }
    }
}

pub fn type_into_focused_field(
    mut keys: MessageReader<KeyboardInput>,
    focused: Res<FocusedField>,
    mut fields: Query<&mut FormField>
) {
    let Some(mut field) = focused.0.and_then(|entity| fields.get_mut(entity).ok()) else {
        keys.clear();
        return;
    };

    for input in keys.read() {
        if !input.state.is_pressed() {
            continue;
        }
        let FieldValue::Text(value) = &mut field.value else {
            continue;
        };
        match &input.logical_key {
            Key::Backspace => {
                value.pop();
            }
            Key::Space => value.push(' '),
            Key::Character(chars) => value.push_str(chars),
            _ => {}
        }
    }
}

pub fn start_contact_submissions(
    mut commands: Commands,
    mut submissions: MessageReader<SubmitContact>,
    i18n: Res<I18n>,
    client: Res<ContactClient>,
    forms: Query<(&ContactForm, Has<PendingSubmission>)>,
    fields: Query<&FormField>,
    mut statuses: Query<(&mut Text, &mut FormStatus)>
) {
    let mut started: Vec<Entity> = Vec::new();

    for SubmitContact(form_entity) in submissions.read() {
        let Ok((form, pending)) = forms.get(*form_entity) else {
            warn!("Submit requested for {} which is not a contact form", form_entity);
            continue;
        };
        if pending || started.contains(form_entity) {
            debug!("Contact form {} is already sending", form_entity);
            continue;
        }

        let lang = i18n.get_lang().to_string();
        if let Ok((mut text, mut status)) = statuses.get_mut(form.status) {
            text.0 = i18n.t("form_messages.sending");
            status.class = StatusClass::Neutral;
        }

        let payload: Vec<(String, String)> = fields
            .iter()
            .filter(|field| field.form == *form_entity)
            .filter_map(FormField::entry)
            .collect();
        let transport = client.0.clone();
        let endpoint = form.endpoint.clone();
        info!("Posting contact form to {}", endpoint);

        let task = IoTaskPool::get().spawn(async move { transport.post(&endpoint, &payload) });
        commands.entity(*form_entity).insert(PendingSubmission { task, lang });
        started.push(*form_entity);
    }
}

pub fn finish_contact_submissions(
    mut commands: Commands,
    i18n: Res<I18n>,
    mut forms: Query<(Entity, &ContactForm, &mut PendingSubmission)>,
    mut fields: Query<&mut FormField>,
    mut statuses: Query<(&mut Text, &mut FormStatus)>
) {
    for (entity, form, mut pending) in &mut forms {
        let Some(response) = block_on(future::poll_once(&mut pending.task)) else {
            continue;
        };

        let outcome = SubmitOutcome::from_response(&response);
        match &response {
            Ok(status) if outcome.is_success() => info!("Contact form delivered (HTTP {})", status),
            Ok(status) => warn!("Contact endpoint answered HTTP {}", status),
            Err(e) => warn!("Contact form submission failed: {}", e),
        }
        let (key, class) = if outcome.is_success() {
            ("form_messages.success", StatusClass::Success)
        } else {
            ("form_messages.error", StatusClass::Error)
        };

        if let Ok((mut text, mut status)) = statuses.get_mut(form.status) {
            text.0 = i18n.catalog().text(&pending.lang, key);
            status.class = class;
        }

        if outcome.is_success() {
            for mut field in &mut fields {
                if field.form == entity {
                    field.reset();
                }
            }
        }

        commands.entity(entity).remove::<PendingSubmission>();
    }
}

pub fn show_field_values(mut fields: Query<(&FormField, &mut Text), Changed<FormField>>) {
    for (field, mut text) in &mut fields {
        text.0 = field.display();
    }
}

pub fn paint_form_status(mut statuses: Query<(&FormStatus, &mut TextColor), Changed<FormStatus>>) {
    for (status, mut color) in &mut statuses {
        color.0 = match status.class {
            StatusClass::Neutral => STATUS_NEUTRAL,
            StatusClass::Success => STATUS_SUCCESS,
            StatusClass::Error => STATUS_ERROR,
        };
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{ mpsc, Mutex };
    use std::time::Duration;

    use bevy::input::ButtonState;

    use super::*;
    use crate::store::MemoryLocaleStore;
    use crate::testing::{ self, MockTransport };

    struct Form {
        form: Entity,
        status: Entity,
        name: Entity,
        email: Entity,
        consent: Entity,
    }

    fn spawn_form(app: &mut App) -> Form {
        let world = app.world_mut();
        let status = world.spawn((Text::new(""), FormStatus::default())).id();
        let form = world
            .spawn(ContactForm { endpoint: "http://mock.test/contact".into(), status })
            .id();

        let mut name = FormField::text(form, "name");
        name.value = FieldValue::Text("Ada Lovelace".into());
        let mut email = FormField::text(form, "email");
        email.value = FieldValue::Text("ada@example.com".into());
        let mut consent = FormField::checkbox(form, "consent");
        consent.value = FieldValue::Checkbox(true);

        let name = world.spawn(name).id();
        let email = world.spawn(email).id();
        let company = FormField::text(form, "company");
        world.spawn(company);
        let consent = world.spawn(consent).id();
        Form { form, status, name, email, consent }
    }

    fn submit_and_wait(app: &mut App, form: Entity) {
        app.world_mut().write_message(SubmitContact(form));
        app.update();
        for _ in 0..500 {
            if app.world().get::<PendingSubmission>(form).is_none() {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
            app.update();
        }
        panic!("submission never completed");
    }

    fn field(app: &App, entity: Entity) -> FieldValue {
        app.world().get::<FormField>(entity).unwrap().value.clone()
    }

    fn status(app: &App, entity: Entity) -> StatusClass {
        app.world().get::<FormStatus>(entity).unwrap().class
    }

    #[test]
    fn success_shows_thanks_and_clears_the_form() {
        let transport = MockTransport::answering(Some(200));
        let mut app = testing::app_with(MemoryLocaleStore::new(), transport.clone());
        app.update();
        let f = spawn_form(&mut app);

        submit_and_wait(&mut app, f.form);

        assert_eq!(testing::text(&app, f.status), "Merci ! Votre message a bien été envoyé.");
        assert_eq!(status(&app, f.status), StatusClass::Success);
        assert_eq!(field(&app, f.name), FieldValue::Text(String::new()));
        assert_eq!(field(&app, f.email), FieldValue::Text(String::new()));
        assert_eq!(field(&app, f.consent), FieldValue::Checkbox(false));

        let posted = transport.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        let (endpoint, fields) = &posted[0];
        assert_eq!(endpoint, "http://mock.test/contact");
        assert!(fields.contains(&("name".to_string(), "Ada Lovelace".to_string())));
        assert!(fields.contains(&("company".to_string(), String::new())));
        assert!(fields.contains(&("consent".to_string(), "on".to_string())));
    }

    #[test]
    fn server_error_keeps_what_was_typed() {
        let mut app = testing::app_with(
            MemoryLocaleStore::new(),
            MockTransport::answering(Some(500))
        );
        app.update();
        let f = spawn_form(&mut app);

        submit_and_wait(&mut app, f.form);

        assert_eq!(testing::text(&app, f.status), "Une erreur est survenue. Merci de réessayer.");
        assert_eq!(status(&app, f.status), StatusClass::Error);
        assert_eq!(field(&app, f.name), FieldValue::Text("Ada Lovelace".into()));
        assert_eq!(field(&app, f.consent), FieldValue::Checkbox(true));
    }

    #[test]
    fn transport_failure_reads_like_a_server_error() {
        let mut app = testing::app_with(
            MemoryLocaleStore::with_value("en"),
            MockTransport::answering(None)
        );
        app.update();
        let f = spawn_form(&mut app);

        submit_and_wait(&mut app, f.form);

        assert_eq!(testing::text(&app, f.status), "Something went wrong. Please try again.");
        assert_eq!(status(&app, f.status), StatusClass::Error);
        assert_eq!(field(&app, f.email), FieldValue::Text("ada@example.com".into()));
    }

    /// Holds every POST until the test sends a status down the channel.
    struct GatedTransport {
        release: Mutex<mpsc::Receiver<u16>>,
    }

    impl GatedTransport {
        fn new() -> (Self, mpsc::Sender<u16>) {
            let (tx, rx) = mpsc::channel();
            (Self { release: Mutex::new(rx) }, tx)
        }
    }

    impl ContactTransport for GatedTransport {
        fn post(&self, _endpoint: &str, _fields: &[(String, String)]) -> Result<u16, TransportError> {
            self.release
                .lock()
                .unwrap()
                .recv()
                .map_err(|_| TransportError::Other("gate dropped".into()))
        }
    }

    #[test]
    fn sending_message_shows_while_in_flight() {
        let (transport, release) = GatedTransport::new();
        let mut app = testing::app_with(MemoryLocaleStore::with_value("en"), transport);
        app.update();
        let f = spawn_form(&mut app);
        app.world_mut().get_mut::<FormStatus>(f.status).unwrap().class = StatusClass::Error;

        app.world_mut().write_message(SubmitContact(f.form));
        app.update();
        app.update();

        assert_eq!(testing::text(&app, f.status), "Sending...");
        assert_eq!(status(&app, f.status), StatusClass::Neutral);
        assert!(app.world().get::<PendingSubmission>(f.form).is_some());

        release.send(200).unwrap();
        for _ in 0..500 {
            if app.world().get::<PendingSubmission>(f.form).is_none() {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
            app.update();
        }

        assert_eq!(testing::text(&app, f.status), "Thanks! Your message has been sent.");
        assert_eq!(status(&app, f.status), StatusClass::Success);
    }

    fn key(logical_key: Key, state: ButtonState) -> KeyboardInput {
        KeyboardInput {
            key_code: KeyCode::KeyA,
            logical_key,
            state,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        }
    }

    #[test]
    fn typing_edits_only_the_focused_field() {
        let mut app = testing::app();
        app.update();
        let f = spawn_form(&mut app);
        app.world_mut().resource_mut::<FocusedField>().0 = Some(f.name);

        let world = app.world_mut();
        world.write_message(key(Key::Backspace, ButtonState::Pressed));
        world.write_message(key(Key::Backspace, ButtonState::Pressed));
        world.write_message(key(Key::Backspace, ButtonState::Pressed));
        world.write_message(key(Key::Backspace, ButtonState::Pressed));
        world.write_message(key(Key::Space, ButtonState::Pressed));
        world.write_message(key(Key::Character("B.".into()), ButtonState::Pressed));
        world.write_message(key(Key::Character("x".into()), ButtonState::Released));
        app.update();

        assert_eq!(field(&app, f.name), FieldValue::Text("Ada Love B.".into()));
        assert_eq!(field(&app, f.email), FieldValue::Text("ada@example.com".into()));
        assert_eq!(field(&app, f.consent), FieldValue::Checkbox(true));
    }

    #[test]
    fn keys_without_focus_change_nothing() {
        let mut app = testing::app();
        app.update();
        let f = spawn_form(&mut app);

        app.world_mut().write_message(key(Key::Character("z".into()), ButtonState::Pressed));
        app.update();

        assert_eq!(field(&app, f.name), FieldValue::Text("Ada Lovelace".into()));
        assert_eq!(field(&app, f.email), FieldValue::Text("ada@example.com".into()));
    }

    #[test]
    fn outcome_is_judged_by_status_class() {
        assert!(SubmitOutcome::from_response(&Ok(200)).is_success());
        assert!(SubmitOutcome::from_response(&Ok(299)).is_success());
        assert_eq!(SubmitOutcome::from_response(&Ok(302)), SubmitOutcome::Rejected(302));
        assert_eq!(SubmitOutcome::from_response(&Ok(404)), SubmitOutcome::Rejected(404));
        assert_eq!(
            SubmitOutcome::from_response(&Err(TransportError::Other("down".into()))),
            SubmitOutcome::Failed
        );
    }

    #[test]
    fn unchecked_boxes_are_not_submitted() {
        let form = Entity::PLACEHOLDER;
        assert_eq!(FormField::checkbox(form, "consent").entry(), None);
        assert_eq!(
            FormField::text(form, "message").entry(),
            Some(("message".to_string(), String::new()))
        );
    }

    #[test]
    fn pressing_fields_focuses_text_and_toggles_boxes() {
        let mut app = testing::app();
        app.update();
        let form = Entity::PLACEHOLDER;
        let name = app.world_mut().spawn((FormField::text(form, "name"), Interaction::None)).id();
        let consent = app
            .world_mut()
            .spawn((FormField::checkbox(form, "consent"), Interaction::None))
            .id();
        app.update();

        *app.world_mut().get_mut::<Interaction>(name).unwrap() = Interaction::Pressed;
        *app.world_mut().get_mut::<Interaction>(consent).unwrap() = Interaction::Pressed;
        app.update();

        assert_eq!(app.world().resource::<FocusedField>().0, Some(name));
        assert_eq!(field(&app, consent), FieldValue::Checkbox(true));
    }
}
