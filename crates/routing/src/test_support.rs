//! Envelope, bodies and handlers shared by the unit tests.

use std::sync::Mutex;

use courier_common::TypeKey;

use crate::{Dispatcher, HeaderMethod, HeaderRegistry, HeaderShape, Supertypes};

pub struct Event<T> {
    pub id: u64,
    pub body: T,
}

pub struct EventView<'a, T: ?Sized> {
    pub id: u64,
    pub body: &'a T,
}

pub struct EventShape;

impl HeaderShape for EventShape {
    type Of<B: Send + Sync + 'static> = Event<B>;
    type View<'a, S: ?Sized + 'static> = EventView<'a, S>;

    fn view<'a, B, S>(header: &'a Event<B>, cast: fn(&B) -> &S) -> EventView<'a, S>
    where
        B: Send + Sync + 'static,
        S: ?Sized + 'static,
    {
        EventView {
            id: header.id,
            body: cast(&header.body),
        }
    }
}

pub trait Auditable: Send + Sync {
    fn actor(&self) -> &str;
}

pub trait Tagged: Send + Sync {
    fn tag(&self) -> &'static str;
}

pub struct Origin {
    pub region: &'static str,
}

pub struct Session {
    pub origin: Origin,
}

pub struct UserLoggedIn {
    pub user: String,
    pub session: Session,
}

impl Auditable for UserLoggedIn {
    fn actor(&self) -> &str {
        &self.user
    }
}

impl Tagged for UserLoggedIn {
    fn tag(&self) -> &'static str {
        "login"
    }
}

pub struct OrderPlaced {
    pub sku: &'static str,
}

/// Nominal message embedding the canonical envelope.
pub struct Wrapped(pub Event<OrderPlaced>);

/// Nominal message declared over two bodies.
pub struct Mixed {
    pub login: Event<UserLoggedIn>,
    pub order: Event<OrderPlaced>,
}

pub fn as_auditable(body: &UserLoggedIn) -> &(dyn Auditable + 'static) {
    body
}

pub fn as_tagged(body: &UserLoggedIn) -> &(dyn Tagged + 'static) {
    body
}

pub fn session(body: &UserLoggedIn) -> &Session {
    &body.session
}

pub fn origin(body: &UserLoggedIn) -> &Origin {
    &body.session.origin
}

pub fn unwrap_order(message: &Wrapped) -> &Event<OrderPlaced> {
    &message.0
}

pub fn mixed_login(message: &Mixed) -> &Event<UserLoggedIn> {
    &message.login
}

pub fn mixed_order(message: &Mixed) -> &Event<OrderPlaced> {
    &message.order
}

pub fn logged_in(id: u64) -> Event<UserLoggedIn> {
    Event {
        id,
        body: UserLoggedIn {
            user: "ada".into(),
            session: Session {
                origin: Origin { region: "eu" },
            },
        },
    }
}

pub fn order(id: u64) -> Event<OrderPlaced> {
    Event {
        id,
        body: OrderPlaced { sku: "sku-1" },
    }
}

/// Handler that records every instantiation it is called with.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<(TypeKey, u64)>>,
    notes: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<(TypeKey, u64)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<TypeKey> {
        self.calls().into_iter().map(|(target, _)| target).collect()
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap().clone()
    }
}

/// `Recorder::Handle<T>(Event<T>)`.
pub struct Handle;

impl HeaderMethod for Handle {
    type Callback = Recorder;
    type Context = ();
    type Shape = EventShape;

    const NAME: &'static str = "Handle";

    fn invoke<S: ?Sized + 'static>(callback: &Recorder, _context: &(), header: EventView<'_, S>) {
        callback
            .calls
            .lock()
            .unwrap()
            .push((TypeKey::of::<S>(), header.id));
    }
}

/// `Recorder::HandleWith<T>(&str, Event<T>)`.
pub struct HandleWith;

impl HeaderMethod for HandleWith {
    type Callback = Recorder;
    type Context = str;
    type Shape = EventShape;

    const NAME: &'static str = "HandleWith";

    fn invoke<S: ?Sized + 'static>(callback: &Recorder, context: &str, _header: EventView<'_, S>) {
        callback
            .notes
            .lock()
            .unwrap()
            .push(format!("{context}:{}", TypeKey::of::<S>()));
    }
}

/// `UserLoggedIn` with two interfaces and two bases, declared interleaved;
/// `OrderPlaced` with none.
pub fn registry() -> HeaderRegistry<Handle> {
    let mut registry = HeaderRegistry::new();
    registry
        .register_with::<UserLoggedIn>(
            Supertypes::<Handle, UserLoggedIn>::new()
                .base::<Session>(session)
                .interface::<dyn Auditable>(as_auditable)
                .base::<Origin>(origin)
                .interface::<dyn Tagged>(as_tagged),
        )
        .and_then(|registry| registry.register::<OrderPlaced>())
        .unwrap();
    registry
}

pub fn context_registry() -> HeaderRegistry<HandleWith> {
    let mut registry = HeaderRegistry::new();
    registry
        .register_with::<UserLoggedIn>(
            Supertypes::<HandleWith, UserLoggedIn>::new().interface::<dyn Auditable>(as_auditable),
        )
        .unwrap();
    registry
}

pub fn targets<M: HeaderMethod>(dispatchers: &[Dispatcher<M>]) -> Vec<TypeKey> {
    dispatchers.iter().map(Dispatcher::target).collect()
}
