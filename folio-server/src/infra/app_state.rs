use std::{fmt, path::PathBuf, sync::Arc};

use folio_config::Config;
use folio_core::{
    AnalyticsService, ContactService, GalleryReconciler, LocalContentStore, Mailer,
    OrderService, ProjectService, Repositories, VerificationService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub projects: Arc<ProjectService>,
    pub verifications: Arc<VerificationService>,
    pub contact: Arc<ContactService>,
    pub orders: Arc<OrderService>,
    pub analytics: Arc<AnalyticsService>,
    uploads_root: PathBuf,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire services from their collaborators.
    pub fn new(
        config: Arc<Config>,
        repositories: Repositories,
        store: LocalContentStore,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let uploads_root = store.root().to_path_buf();

        let gallery = GalleryReconciler::new(Arc::new(store))
            .with_upload_timeout(config.storage.upload_timeout());
        let projects = ProjectService::new(repositories.projects, gallery);

        let verifications = VerificationService::new(repositories.verifications, mailer.clone())
            .with_code_ttl(code_ttl(config.verification.ttl_secs));
        let contact = ContactService::new(
            verifications.clone(),
            mailer.clone(),
            config.mail.admin_email.clone(),
        );
        let orders = OrderService::new(mailer, config.mail.admin_email.clone());
        let analytics = AnalyticsService::new(repositories.clicks);

        Self {
            config,
            projects: Arc::new(projects),
            verifications: Arc::new(verifications),
            contact: Arc::new(contact),
            orders: Arc::new(orders),
            analytics: Arc::new(analytics),
            uploads_root,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory served under `/uploads`.
    pub fn uploads_root(&self) -> &PathBuf {
        &self.uploads_root
    }
}

const MAX_CODE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

fn code_ttl(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(MAX_CODE_TTL_SECS) as i64)
}
