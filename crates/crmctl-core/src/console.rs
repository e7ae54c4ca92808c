// ── Console ──
//
// The context object every front end holds: transport, query cache,
// resource registry and session. Cheaply cloneable.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::SecretString;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crmctl_api::{ApiClient, ListQuery, LoginResponse, TransportConfig};

use crate::cache::QueryCache;
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::model::{Contact, Filter, FilterType, Lead, LeadStatus, Pipeline, Role, Stage, User};
use crate::modules::{self, FormMode, Intent, Lookups, leads};
use crate::resource::{AuthFailureHook, ResourceApi, ResourceDescriptor, ResourceRegistry};
use crate::session::{Session, SessionStore, SessionUser};
use crate::validation::validate;

/// Handle to one backend.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    state: Arc<SessionState>,
    registry: ResourceRegistry,
}

/// Everything logout tears down. Held by the resource APIs as their auth
/// hook, so it must not own the registry.
struct SessionState {
    client: Arc<ApiClient>,
    cache: Arc<QueryCache>,
    store: Arc<dyn SessionStore>,
    session: ArcSwapOption<Session>,
}

impl SessionState {
    fn teardown(&self) -> Result<(), CoreError> {
        self.cache.reset();
        self.client.set_token(None);
        self.session.store(None);
        self.store.clear()
    }
}

impl AuthFailureHook for SessionState {
    fn on_auth_failure(&self, err: &CoreError) {
        warn!(error = %err, "session rejected by server, signing out");
        if let Err(e) = self.teardown() {
            warn!(error = %e, "failed to clear stored session");
        }
    }
}

impl Console {
    /// Build the transport and restore any saved session from `store`.
    pub fn init(config: ConsoleConfig, store: Arc<dyn SessionStore>) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = Arc::new(ApiClient::new(config.base_url.clone(), &transport)?);

        let saved = store.load()?;
        if let Some(session) = &saved {
            debug!(user = session.user.display_name(), "restored session");
            client.set_token(Some(session.token.clone()));
        }

        let state = Arc::new(SessionState {
            client,
            cache: Arc::new(QueryCache::new()),
            store,
            session: ArcSwapOption::from(saved.map(Arc::new)),
        });

        let registry = ResourceRegistry::new(ResourceDescriptor::ALL, |descriptor| {
            make_api(&state, &config, descriptor)
        });

        Ok(Self {
            inner: Arc::new(ConsoleInner {
                config,
                state,
                registry,
            }),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.inner.state.cache
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.inner.registry
    }

    /// The untyped operation set for `name`.
    pub fn resource(&self, name: &str) -> Result<&ResourceApi<Value>, CoreError> {
        self.inner.registry.get(name)
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Sign in with email and password.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SessionUser, CoreError> {
        let response = self.inner.state.client.login(email, password).await?;
        self.establish(response).await
    }

    /// Passwordless admin sign-in.
    pub async fn admin_login(&self, email: &str, is_client_page: bool) -> Result<SessionUser, CoreError> {
        let response = self.inner.state.client.admin_login(email, is_client_page).await?;
        self.establish(response).await
    }

    async fn establish(&self, response: LoginResponse) -> Result<SessionUser, CoreError> {
        let state = &self.inner.state;
        state.client.set_token(Some(response.token.clone()));

        let mut user = SessionUser::from(response.user);
        if let Some(role_id) = user.role_id.clone() {
            match state.client.get_role(&role_id).await {
                Ok(role) => user.role_name = Some(role.role_name),
                Err(e) => warn!(role_id, error = %e, "could not resolve role name"),
            }
        }

        state.cache.reset();
        let session = Session {
            token: response.token,
            user: user.clone(),
        };
        state.store.save(&session)?;
        state.session.store(Some(Arc::new(session)));
        info!(user = user.display_name(), role = ?user.role_name, "signed in");
        Ok(user)
    }

    /// Drop the cache, the token and the saved session.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.inner.state.teardown()?;
        info!("signed out");
        Ok(())
    }

    pub fn current_session(&self) -> Option<Arc<Session>> {
        self.inner.state.session.load_full()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.session.load().is_some()
    }

    // ── Typed resources ──────────────────────────────────────────────

    fn typed<T>(&self, descriptor: ResourceDescriptor) -> ResourceApi<T> {
        make_api(&self.inner.state, &self.inner.config, descriptor).retyped()
    }

    pub fn users(&self) -> ResourceApi<User> {
        self.typed(ResourceDescriptor::USER)
    }

    pub fn roles(&self) -> ResourceApi<Role> {
        self.typed(ResourceDescriptor::ROLE)
    }

    pub fn leads(&self) -> ResourceApi<Lead> {
        self.typed(ResourceDescriptor::LEAD)
    }

    pub fn contacts(&self) -> ResourceApi<Contact> {
        self.typed(ResourceDescriptor::CONTACT)
    }

    pub fn pipelines(&self) -> ResourceApi<Pipeline> {
        self.typed(ResourceDescriptor::PIPELINE)
    }

    pub fn stages(&self) -> ResourceApi<Stage> {
        self.typed(ResourceDescriptor::STAGE)
    }

    pub fn filters(&self) -> ResourceApi<Filter> {
        self.typed(ResourceDescriptor::FILTER)
    }

    // ── Form-backed writes ───────────────────────────────────────────

    /// Validate `values` against the create form of `resource`, then create.
    pub async fn create_record(&self, resource: &str, values: Map<String, Value>) -> Result<Value, CoreError> {
        let api = self.resource(resource)?;
        let form = form_for(resource, FormMode::Create)?;
        validate(&form, &values).map_err(CoreError::InvalidInput)?;

        let payload = match resource {
            "lead" => {
                let stages = self.stages().list_all(&ListQuery::all()).await?;
                leads::with_default_stage(values, &stages)?
            }
            "stage" => modules::stages::to_payload(values),
            _ => values,
        };
        api.create(&payload).await
    }

    /// Merge `patch` over the stored record, validate against the edit form,
    /// then update.
    pub async fn update_record(
        &self,
        resource: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Value, CoreError> {
        let api = self.resource(resource)?;
        let form = form_for(resource, FormMode::Edit)?;
        let current = api.get(id).await?;

        let mut values = match current {
            Value::Object(map) if resource == "stage" => modules::stages::to_form(map),
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for field in form.iter().filter(|f| f.locked_on_edit) {
            if let Some(new) = patch.get(&field.name) {
                if values.get(&field.name) != Some(new) {
                    return Err(CoreError::Rejected {
                        message: format!("{} cannot be changed", field.title),
                    });
                }
            }
        }
        values.extend(patch);
        if resource == "user" && values.get("password").is_some_and(crate::table::is_blank) {
            values.remove("password");
        }
        validate(&form, &values).map_err(CoreError::InvalidInput)?;

        let payload = match resource {
            "stage" => modules::stages::to_payload(values),
            _ => values,
        };
        api.update(id, &payload).await
    }

    /// Delete `id` through its row action, refusing when the action is
    /// hidden or disabled for that record.
    pub async fn delete_record(&self, resource: &str, id: &str) -> Result<Option<String>, CoreError> {
        let api = self.resource(resource)?;
        let view = modules::view(resource, &Lookups::default()).ok_or_else(|| CoreError::UnknownResource {
            name: resource.to_owned(),
        })?;
        let record = api.get(id).await?;

        let item = view.actions.find(&record, "delete").ok_or_else(|| CoreError::Rejected {
            message: format!("{resource} {id} cannot be deleted"),
        })?;
        if item.disabled {
            return Err(CoreError::Rejected {
                message: format!("{resource} {id} is protected"),
            });
        }
        match item.click() {
            Some(Intent::Delete(target)) => api.delete(&target).await,
            _ => Err(CoreError::Internal(format!("delete action of {resource} did not resolve"))),
        }
    }

    // ── Lookups and leads ────────────────────────────────────────────

    /// Name maps for foreign-key columns.
    pub async fn lookups(&self) -> Result<Lookups, CoreError> {
        let all = ListQuery::all();
        let roles = self.roles();
        let pipelines = self.pipelines();
        let stages = self.stages();
        let filters = self.filters();
        let (roles, pipelines, stages, filters) = futures_util::try_join!(
            roles.list_all(&all),
            pipelines.list_all(&all),
            stages.list_all(&all),
            filters.list_all(&all),
        )?;
        Ok(Lookups::build(&roles, &pipelines, &stages, &filters))
    }

    /// The lead board of `pipeline`.
    pub async fn board(&self, pipeline: &str) -> Result<leads::Board, CoreError> {
        let all = ListQuery::all();
        let in_pipeline = ListQuery::all().filter("pipeline", pipeline);
        let lead_sources = ListQuery::all().filter("type", FilterType::Source.to_string());
        let stages = self.stages();
        let leads_api = self.leads();
        let contacts = self.contacts();
        let filters = self.filters();
        let (stages, leads, contacts, sources) = futures_util::try_join!(
            stages.list_all(&all),
            leads_api.list_all(&in_pipeline),
            contacts.list_all(&all),
            filters.list_all(&lead_sources),
        )?;
        let lookups = Lookups::build(&[], &[], &[], &sources).with_contacts(&contacts);
        Ok(leads::build_board(pipeline, &stages, &leads, &lookups))
    }

    /// Move a lead to another stage. `None` when it is already there.
    pub async fn move_lead(&self, lead_id: &str, stage_id: &str) -> Result<Option<Value>, CoreError> {
        let api = self.resource("lead")?;
        let record = api.get(lead_id).await?;
        match leads::move_payload(&record, stage_id)? {
            Some(body) => Ok(Some(api.update(lead_id, &body).await?)),
            None => Ok(None),
        }
    }

    /// Put a stage at board position `index`.
    pub async fn reorder_stage(&self, stage_id: &str, index: usize) -> Result<Value, CoreError> {
        let api = self.resource("stage")?;
        let record = api.get(stage_id).await?;
        api.update(stage_id, &leads::reorder_payload(&record, index)?).await
    }

    /// Flip a lead open or closed.
    pub async fn set_lead_status(&self, lead_id: &str, status: LeadStatus) -> Result<Value, CoreError> {
        let api = self.resource("lead")?;
        let record = api.get(lead_id).await?;
        api.update(lead_id, &leads::status_payload(&record, status)?).await
    }
}

fn make_api(state: &Arc<SessionState>, config: &ConsoleConfig, descriptor: ResourceDescriptor) -> ResourceApi<Value> {
    let hook: Arc<dyn AuthFailureHook> = Arc::clone(state) as Arc<dyn AuthFailureHook>;
    ResourceApi::new(descriptor, Arc::clone(&state.client), Arc::clone(&state.cache))
        .with_auth_hook(hook)
        .with_page_size(config.page_size)
}

fn form_for(resource: &str, mode: FormMode) -> Result<Vec<crate::table::FieldDescriptor>, CoreError> {
    modules::form(resource, mode).ok_or_else(|| CoreError::UnknownResource {
        name: resource.to_owned(),
    })
}
