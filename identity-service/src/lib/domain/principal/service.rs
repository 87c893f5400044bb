use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenIssuer;

use crate::principal::errors::AuthenticationError;
use crate::principal::errors::RegistrationError;
use crate::principal::errors::UniqueField;
use crate::principal::models::AccessGrant;
use crate::principal::models::AuthenticateCommand;
use crate::principal::models::ContactAddress;
use crate::principal::models::DisplayName;
use crate::principal::models::NewPrincipal;
use crate::principal::models::PlainSecret;
use crate::principal::models::PrecheckStrategy;
use crate::principal::models::RegisterCommand;
use crate::principal::ports::IdentityServicePort;
use crate::principal::ports::PrincipalRepository;

const DECOY_SECRET: &str = "decoy-secret-for-unknown-addresses";

/// Domain service implementation for registration and authentication.
///
/// Holds no per-request state. Hashing and verification run on the blocking pool.
pub struct IdentityService<R>
where
    R: PrincipalRepository,
{
    repository: Arc<R>,
    password_hasher: PasswordHasher,
    token_issuer: Arc<TokenIssuer>,
    precheck: PrecheckStrategy,
    decoy_hash: Option<String>,
}

impl<R> IdentityService<R>
where
    R: PrincipalRepository,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Identity store implementation
    /// * `password_hasher` - Hasher configured with the deployment's cost
    /// * `token_issuer` - Issuer holding the signing key
    pub fn new(
        repository: Arc<R>,
        password_hasher: PasswordHasher,
        token_issuer: Arc<TokenIssuer>,
    ) -> Self {
        let decoy_hash = match password_hasher.hash(DECOY_SECRET) {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to prepare decoy hash");
                None
            }
        };

        Self {
            repository,
            password_hasher,
            token_issuer,
            precheck: PrecheckStrategy::default(),
            decoy_hash,
        }
    }

    /// Select how registration looks for an existing principal.
    pub fn with_precheck(mut self, precheck: PrecheckStrategy) -> Self {
        self.precheck = precheck;
        self
    }

    async fn find_conflict(
        &self,
        display_name: &DisplayName,
        contact_address: &ContactAddress,
    ) -> Result<Option<UniqueField>, RegistrationError> {
        match self.precheck {
            PrecheckStrategy::Combined => {
                let existing = self
                    .repository
                    .find_by_identity(display_name, contact_address)
                    .await?;

                Ok(existing.map(|principal| {
                    if &principal.display_name == display_name {
                        UniqueField::DisplayName
                    } else {
                        UniqueField::ContactAddress
                    }
                }))
            }
            PrecheckStrategy::PerField => {
                if self
                    .repository
                    .find_by_display_name(display_name)
                    .await?
                    .is_some()
                {
                    return Ok(Some(UniqueField::DisplayName));
                }

                if self
                    .repository
                    .find_by_contact(contact_address)
                    .await?
                    .is_some()
                {
                    return Ok(Some(UniqueField::ContactAddress));
                }

                Ok(None)
            }
        }
    }

    async fn hash_secret(&self, secret: PlainSecret) -> Result<String, RegistrationError> {
        let hasher = self.password_hasher.clone();

        let hash = tokio::task::spawn_blocking(move || hasher.hash(secret.expose()))
            .await
            .map_err(|e| RegistrationError::Task(e.to_string()))??;

        Ok(hash)
    }

    async fn verify_secret(
        &self,
        secret: PlainSecret,
        stored_hash: String,
    ) -> Result<bool, AuthenticationError> {
        let hasher = self.password_hasher.clone();

        tokio::task::spawn_blocking(move || hasher.verify(secret.expose(), &stored_hash))
            .await
            .map_err(|e| AuthenticationError::Task(e.to_string()))
    }
}

#[async_trait]
impl<R> IdentityServicePort for IdentityService<R>
where
    R: PrincipalRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<AccessGrant, RegistrationError> {
        // Best effort only; the insert below is what actually guards uniqueness
        if let Some(field) = self
            .find_conflict(&command.display_name, &command.contact_address)
            .await?
        {
            tracing::info!(field = %field, "Registration rejected: identity already taken");
            return Err(RegistrationError::AlreadyExists(field));
        }

        let secret_hash = self.hash_secret(command.secret).await?;

        let principal = self
            .repository
            .insert(NewPrincipal {
                display_name: command.display_name,
                contact_address: command.contact_address,
                secret_hash,
            })
            .await
            .map_err(|e| {
                let err = RegistrationError::from(e);
                if let RegistrationError::AlreadyExists(field) = &err {
                    tracing::info!(field = %field, "Registration lost insert race");
                }
                err
            })?;

        // The principal is already stored; HS256 signing with a validated key does not fail
        let token = self
            .token_issuer
            .issue(principal.id, principal.contact_address.as_str())?;

        tracing::info!(principal_id = %principal.id, "Principal registered");

        Ok(AccessGrant { token, principal })
    }

    async fn authenticate(
        &self,
        command: AuthenticateCommand,
    ) -> Result<AccessGrant, AuthenticationError> {
        let Ok(contact_address) = ContactAddress::new(command.contact_address) else {
            tracing::info!("Login rejected");
            return Err(AuthenticationError::InvalidCredentials);
        };

        let Some(principal) = self.repository.find_by_contact(&contact_address).await? else {
            // Unknown addresses pay the same Argon2 cost as known ones
            if let Some(decoy_hash) = &self.decoy_hash {
                self.verify_secret(command.secret, decoy_hash.clone()).await?;
            }
            tracing::info!("Login rejected");
            return Err(AuthenticationError::InvalidCredentials);
        };

        if !self
            .verify_secret(command.secret, principal.secret_hash.clone())
            .await?
        {
            tracing::info!("Login rejected");
            return Err(AuthenticationError::InvalidCredentials);
        }

        let token = self
            .token_issuer
            .issue(principal.id, principal.contact_address.as_str())?;

        tracing::info!(principal_id = %principal.id, "Principal authenticated");

        Ok(AccessGrant { token, principal })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::principal::errors::StoreError;
    use crate::principal::models::Principal;
    use crate::principal::models::PrincipalId;

    mock! {
        pub TestPrincipalRepository {}

        #[async_trait]
        impl PrincipalRepository for TestPrincipalRepository {
            async fn find_by_identity(&self, display_name: &DisplayName, contact_address: &ContactAddress) -> Result<Option<Principal>, StoreError>;
            async fn find_by_display_name(&self, display_name: &DisplayName) -> Result<Option<Principal>, StoreError>;
            async fn find_by_contact(&self, contact_address: &ContactAddress) -> Result<Option<Principal>, StoreError>;
            async fn insert(&self, principal: NewPrincipal) -> Result<Principal, StoreError>;
        }
    }

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(1024, 1, 1).unwrap()
    }

    fn issuer() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(SECRET).unwrap())
    }

    fn service(
        repository: MockTestPrincipalRepository,
    ) -> IdentityService<MockTestPrincipalRepository> {
        IdentityService::new(Arc::new(repository), hasher(), issuer())
    }

    fn stored(id: i64, display_name: &str, email: &str, password: &str) -> Principal {
        Principal {
            id: PrincipalId(id),
            display_name: DisplayName::new(display_name.to_string()).unwrap(),
            contact_address: ContactAddress::new(email.to_string()).unwrap(),
            secret_hash: hasher().hash(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn register_command(display_name: &str, email: &str, password: &str) -> RegisterCommand {
        RegisterCommand::parse(
            Some(display_name.to_string()),
            Some(email.to_string()),
            Some(password.to_string()),
        )
        .unwrap()
    }

    fn login_command(email: &str, password: &str) -> AuthenticateCommand {
        AuthenticateCommand::parse(Some(email.to_string()), Some(password.to_string())).unwrap()
    }

    fn persist(principal: NewPrincipal) -> Result<Principal, StoreError> {
        Ok(Principal {
            id: PrincipalId(1),
            display_name: principal.display_name,
            contact_address: principal.contact_address,
            secret_hash: principal.secret_hash,
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestPrincipalRepository::new();

        repository
            .expect_find_by_identity()
            .withf(|name, email| name.as_str() == "alice" && email.as_str() == "a@x.com")
            .times(1)
            .returning(|_, _| Ok(None));

        repository
            .expect_insert()
            .withf(|principal| {
                principal.display_name.as_str() == "alice"
                    && principal.contact_address.as_str() == "a@x.com"
                    && principal.secret_hash.starts_with("$argon2id")
                    && hasher().verify("pw123456", &principal.secret_hash)
            })
            .times(1)
            .returning(persist);

        let issuer = issuer();
        let service = IdentityService::new(Arc::new(repository), hasher(), Arc::clone(&issuer));

        let grant = service
            .register(register_command("alice", "a@x.com", "pw123456"))
            .await
            .unwrap();

        assert_eq!(grant.principal.id, PrincipalId(1));
        assert_eq!(grant.principal.contact_address.as_str(), "a@x.com");

        let claims = issuer.validate(&grant.token).unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_register_precheck_conflict_skips_insert() {
        let mut repository = MockTestPrincipalRepository::new();

        repository
            .expect_find_by_identity()
            .times(1)
            .returning(|_, _| Ok(Some(stored(7, "alice", "other@x.com", "pw"))));
        repository.expect_insert().times(0);

        let result = service(repository)
            .register(register_command("alice", "a@x.com", "pw123456"))
            .await;

        assert!(matches!(
            result,
            Err(RegistrationError::AlreadyExists(UniqueField::DisplayName))
        ));
    }

    #[tokio::test]
    async fn test_register_precheck_reports_contact_collision() {
        let mut repository = MockTestPrincipalRepository::new();

        repository
            .expect_find_by_identity()
            .times(1)
            .returning(|_, _| Ok(Some(stored(7, "someone", "a@x.com", "pw"))));
        repository.expect_insert().times(0);

        let result = service(repository)
            .register(register_command("alice", "a@x.com", "pw123456"))
            .await;

        assert!(matches!(
            result,
            Err(RegistrationError::AlreadyExists(UniqueField::ContactAddress))
        ));
    }

    #[tokio::test]
    async fn test_register_lost_race_is_conflict() {
        let mut repository = MockTestPrincipalRepository::new();

        repository
            .expect_find_by_identity()
            .times(1)
            .returning(|_, _| Ok(None));
        repository.expect_insert().times(1).returning(|_| {
            Err(StoreError::UniquenessViolation(UniqueField::ContactAddress))
        });

        let result = service(repository)
            .register(register_command("alice", "a@x.com", "pw123456"))
            .await;

        assert!(matches!(
            result,
            Err(RegistrationError::AlreadyExists(UniqueField::ContactAddress))
        ));
    }

    #[tokio::test]
    async fn test_register_store_failure_is_infrastructure() {
        let mut repository = MockTestPrincipalRepository::new();

        repository
            .expect_find_by_identity()
            .times(1)
            .returning(|_, _| Err(StoreError::Database("connection refused".to_string())));
        repository.expect_insert().times(0);

        let result = service(repository)
            .register(register_command("alice", "a@x.com", "pw123456"))
            .await;

        assert!(matches!(result, Err(RegistrationError::Store(_))));
    }

    #[tokio::test]
    async fn test_register_per_field_precheck() {
        let mut repository = MockTestPrincipalRepository::new();

        repository.expect_find_by_identity().times(0);
        repository
            .expect_find_by_display_name()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_find_by_contact()
            .times(1)
            .returning(|_| Ok(Some(stored(7, "someone", "a@x.com", "pw"))));
        repository.expect_insert().times(0);

        let result = service(repository)
            .with_precheck(PrecheckStrategy::PerField)
            .register(register_command("alice", "a@x.com", "pw123456"))
            .await;

        assert!(matches!(
            result,
            Err(RegistrationError::AlreadyExists(UniqueField::ContactAddress))
        ));
    }

    #[tokio::test]
    async fn test_register_per_field_precheck_success() {
        let mut repository = MockTestPrincipalRepository::new();

        repository
            .expect_find_by_display_name()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_find_by_contact()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_insert().times(1).returning(persist);

        let grant = service(repository)
            .with_precheck(PrecheckStrategy::PerField)
            .register(register_command("alice", "a@x.com", "pw123456"))
            .await
            .unwrap();

        assert_eq!(grant.principal.display_name.as_str(), "alice");
        assert!(!grant.token.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut repository = MockTestPrincipalRepository::new();
        let principal = stored(3, "alice", "a@x.com", "pw123456");

        repository
            .expect_find_by_contact()
            .withf(|email| email.as_str() == "a@x.com")
            .times(1)
            .returning(move |_| Ok(Some(principal.clone())));
        repository.expect_insert().times(0);

        let issuer = issuer();
        let service = IdentityService::new(Arc::new(repository), hasher(), Arc::clone(&issuer));

        let grant = service
            .authenticate(login_command("a@x.com", "pw123456"))
            .await
            .unwrap();

        assert_eq!(grant.principal.id, PrincipalId(3));
        assert_eq!(issuer.validate(&grant.token).unwrap().sub, "3");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut repository = MockTestPrincipalRepository::new();
        let principal = stored(3, "alice", "a@x.com", "pw123456");

        repository
            .expect_find_by_contact()
            .times(1)
            .returning(move |_| Ok(Some(principal.clone())));

        let result = service(repository)
            .authenticate(login_command("a@x.com", "wrong"))
            .await;

        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_address() {
        let mut repository = MockTestPrincipalRepository::new();

        repository
            .expect_find_by_contact()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository)
            .authenticate(login_command("nobody@x.com", "pw123456"))
            .await;

        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_unknown_address_verifies_against_decoy_of_same_cost() {
        let service = service(MockTestPrincipalRepository::new());

        let decoy_hash = service.decoy_hash.clone().unwrap();
        assert!(decoy_hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));

        let matched = service
            .verify_secret(PlainSecret::new("pw123456".to_string()), decoy_hash)
            .await
            .unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn test_authenticate_malformed_address_skips_lookup() {
        let mut repository = MockTestPrincipalRepository::new();
        repository.expect_find_by_contact().times(0);

        let result = service(repository)
            .authenticate(login_command("not-an-email", "pw123456"))
            .await;

        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_corrupt_hash_is_rejected() {
        let mut repository = MockTestPrincipalRepository::new();
        let mut principal = stored(3, "alice", "a@x.com", "pw123456");
        principal.secret_hash = "not-a-phc-string".to_string();

        repository
            .expect_find_by_contact()
            .times(1)
            .returning(move |_| Ok(Some(principal.clone())));

        let result = service(repository)
            .authenticate(login_command("a@x.com", "pw123456"))
            .await;

        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_store_failure() {
        let mut repository = MockTestPrincipalRepository::new();

        repository
            .expect_find_by_contact()
            .times(1)
            .returning(|_| Err(StoreError::Database("timeout".to_string())));

        let result = service(repository)
            .authenticate(login_command("a@x.com", "pw123456"))
            .await;

        assert!(matches!(result, Err(AuthenticationError::Store(_))));
    }
}
