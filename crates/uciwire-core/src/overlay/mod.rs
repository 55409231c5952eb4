// ── Configuration overlay ──
//
// Explicit instance owned by the composition root. Queries and mutations
// are synchronous and take a short std mutex that is never held across an
// `.await`; loading, saving and applying are async and talk to the
// `ConfigService`.

mod apply;
mod save;

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tokio::sync::{OnceCell, watch};
use tracing::debug;

use uciwire_api::UbusClient;
use uciwire_api::transport::{TlsMode, TransportConfig};

use crate::config::{ApplySettings, AuthCredentials, RemoteConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{OptionValue, Section, SectionRef};
use crate::remote::ConfigService;
use crate::store::{self, OverlayState};

pub use apply::ApplyState;
pub use save::{CreatedSection, SaveReport};

/// Client-side overlay over remote UCI configurations.
///
/// Cheaply cloneable; clones share the same cache and pending logs.
pub struct Overlay<S> {
    inner: Arc<OverlayInner<S>>,
}

/// The overlay as the CLI uses it: backed by the JSON-RPC client.
pub type RemoteOverlay = Overlay<UbusClient>;

struct OverlayInner<S> {
    service: S,
    state: Mutex<OverlayState>,
    /// One cell per configuration so concurrent loads share a single
    /// in-flight `get`. Removed on unload, reload and a failed post-save reload.
    loads: DashMap<String, Arc<OnceCell<()>>>,
    apply_settings: ApplySettings,
    apply_state: watch::Sender<ApplyState>,
}

impl<S> Clone for Overlay<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Overlay<UbusClient> {
    /// Build the JSON-RPC client for `config`, log in if credentials are
    /// given, and wrap it in a fresh overlay.
    pub async fn connect(config: RemoteConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: match config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: config.timeout,
        };
        let client = UbusClient::new(config.url.clone(), &transport)?;

        match &config.auth {
            AuthCredentials::Anonymous => debug!(url = %config.url, "using anonymous session"),
            AuthCredentials::Credentials { username, password } => {
                client.login(username, password).await?;
            }
        }

        Ok(Self::with_settings(client, config.apply))
    }
}

impl<S: ConfigService> Overlay<S> {
    pub fn new(service: S) -> Self {
        Self::with_settings(service, ApplySettings::default())
    }

    pub fn with_settings(service: S, apply_settings: ApplySettings) -> Self {
        let (apply_state, _) = watch::channel(ApplyState::Idle);
        Self {
            inner: Arc::new(OverlayInner {
                service,
                state: Mutex::new(OverlayState::new()),
                loads: DashMap::new(),
                apply_settings,
                apply_state,
            }),
        }
    }

    /// The remote service this overlay talks to.
    pub fn service(&self) -> &S {
        &self.inner.service
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut OverlayState) -> R) -> R {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Fetch and cache `conf` unless it is already loaded. Concurrent calls
    /// for the same configuration share one remote request; a failed fetch
    /// is not cached.
    pub async fn load(&self, conf: &str) -> Result<(), CoreError> {
        self.fetch(conf, false).await
    }

    /// Replace the cached snapshot of `conf` with a fresh one. Pending logs
    /// are kept.
    pub async fn reload(&self, conf: &str) -> Result<(), CoreError> {
        self.fetch(conf, true).await
    }

    async fn fetch(&self, conf: &str, force: bool) -> Result<(), CoreError> {
        if force {
            self.inner.loads.remove(conf);
        }
        let cell = self
            .inner
            .loads
            .entry(conf.to_owned())
            .or_default()
            .value()
            .clone();

        cell.get_or_try_init(|| async {
            if !force && self.with_state(|s| s.is_loaded(conf)) {
                return Ok(());
            }
            let values = self.inner.service.get(conf).await?;
            debug!(conf, sections = values.len(), "configuration loaded");
            self.with_state(|s| s.install(conf, values));
            Ok::<(), CoreError>(())
        })
        .await?;
        Ok(())
    }

    /// Load several configurations concurrently.
    pub async fn load_all<I, T>(&self, confs: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let confs: Vec<T> = confs.into_iter().collect();
        futures_util::future::try_join_all(confs.iter().map(|c| self.load(c.as_ref()))).await?;
        Ok(())
    }

    /// Forget the snapshot of `conf` without touching its pending logs.
    fn invalidate(&self, conf: &str) {
        self.inner.loads.remove(conf);
        self.with_state(|s| s.invalidate(conf));
    }

    /// Discard the cached snapshot and all pending changes of `conf`.
    /// Nothing is sent to the remote.
    pub fn unload(&self, conf: &str) {
        debug!(conf, "unloading configuration");
        self.inner.loads.remove(conf);
        self.with_state(|s| s.unload(conf));
    }

    pub fn is_loaded(&self, conf: &str) -> bool {
        self.with_state(|s| s.is_loaded(conf))
    }

    /// Configurations with unsaved local changes.
    pub fn pending(&self) -> Vec<String> {
        self.with_state(|s| s.pending_configs())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn sections(&self, conf: &str, section_type: Option<&str>) -> Vec<Section> {
        self.with_state(|s| s.sections(conf, section_type))
    }

    /// Concrete section id for a reference, or `None` if a positional
    /// reference matches nothing.
    pub fn resolve(&self, conf: &str, sid: impl Into<SectionRef>) -> Option<String> {
        let sid = sid.into();
        self.with_state(|s| s.resolve(conf, &sid))
    }

    pub fn get(&self, conf: &str, sid: impl Into<SectionRef>, opt: &str) -> Option<OptionValue> {
        let sid = sid.into();
        self.with_state(|s| s.get(conf, &sid, opt))
    }

    /// Whole effective section.
    pub fn section(&self, conf: &str, sid: impl Into<SectionRef>) -> Option<Section> {
        let sid = sid.into();
        self.with_state(|s| s.section(conf, &sid))
    }

    pub fn first_section(&self, conf: &str, section_type: Option<&str>) -> Option<Section> {
        self.with_state(|s| s.first_section(conf, section_type))
    }

    pub fn get_first(
        &self,
        conf: &str,
        section_type: Option<&str>,
        opt: &str,
    ) -> Option<OptionValue> {
        let first = self.first_section(conf, section_type)?;
        self.get(conf, first.name, opt)
    }

    /// `get` interpreted with UCI's boolean convention.
    pub fn get_bool(&self, conf: &str, sid: impl Into<SectionRef>, opt: &str) -> bool {
        store::is_truthy(self.get(conf, sid, opt).as_ref())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Queue a new section and return its id. Without a `name` a random
    /// `newXXXXXX` id is generated.
    pub fn add(&self, conf: &str, section_type: &str, name: Option<&str>) -> String {
        self.with_state(|s| s.add(conf, section_type, name))
            .or_else(|| name.map(str::to_owned))
            .unwrap_or_default()
    }

    /// Queue a copy of `src`. `None` if `src` does not exist.
    pub fn clone_section(
        &self,
        conf: &str,
        section_type: &str,
        src: impl Into<SectionRef>,
        put_next: bool,
        name: Option<&str>,
    ) -> Option<String> {
        let src = src.into();
        self.with_state(|s| s.clone_section(conf, section_type, &src, put_next, name))
    }

    pub fn remove(&self, conf: &str, sid: impl Into<SectionRef>) {
        let sid = sid.into();
        self.with_state(|s| s.remove(conf, &sid));
    }

    /// Set an option. An empty value unsets it.
    pub fn set(
        &self,
        conf: &str,
        sid: impl Into<SectionRef>,
        opt: &str,
        value: impl Into<OptionValue>,
    ) {
        let sid = sid.into();
        let value = value.into();
        self.with_state(|s| s.set(conf, &sid, opt, Some(value)));
    }

    pub fn unset(&self, conf: &str, sid: impl Into<SectionRef>, opt: &str) {
        let sid = sid.into();
        self.with_state(|s| s.set(conf, &sid, opt, None));
    }

    pub fn set_first(
        &self,
        conf: &str,
        section_type: Option<&str>,
        opt: &str,
        value: impl Into<OptionValue>,
    ) {
        if let Some(first) = self.first_section(conf, section_type) {
            self.set(conf, first.name, opt, value);
        }
    }

    pub fn unset_first(&self, conf: &str, section_type: Option<&str>, opt: &str) {
        if let Some(first) = self.first_section(conf, section_type) {
            self.unset(conf, first.name, opt);
        }
    }

    /// Move `sid1` before `sid2` (or after it, with `after`), or to the end
    /// when `sid2` is `None`. `false` if either reference does not resolve.
    pub fn move_section(
        &self,
        conf: &str,
        sid1: impl Into<SectionRef>,
        sid2: Option<SectionRef>,
        after: bool,
    ) -> bool {
        let sid1 = sid1.into();
        self.with_state(|s| s.move_section(conf, &sid1, sid2.as_ref(), after))
    }
}
