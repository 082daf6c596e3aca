use super::Account;
use crate::error::AuthFailure;
use constant_time_eq::constant_time_eq;
use log::warn;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    #[error("no valid `user:password` pair found in the allowed users list")]
    NoAccounts,
}

/// How usernames and passwords are compared at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    fn normalize(&self, value: &str) -> String {
        match self {
            CaseSensitivity::Sensitive => value.to_string(),
            CaseSensitivity::Insensitive => value.to_lowercase(),
        }
    }
}

/// Static table of accounts allowed to log in.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    accounts: Vec<Account>,
    case: CaseSensitivity,
}

impl CredentialStore {
    pub fn new(accounts: Vec<Account>, case: CaseSensitivity) -> Result<Self, CredentialError> {
        if accounts.is_empty() {
            return Err(CredentialError::NoAccounts);
        }
        Ok(Self { accounts, case })
    }

    /// Parses `user:pass,user2:pass2`.
    ///
    /// Each pair is split on its first `:`, so passwords may themselves
    /// contain colons. Both halves are trimmed and incomplete pairs are
    /// skipped. Fails if nothing usable remains.
    pub fn parse(raw: &str, case: CaseSensitivity) -> Result<Self, CredentialError> {
        let mut accounts = Vec::new();
        for (index, pair) in raw.split(',').enumerate() {
            if pair.trim().is_empty() {
                continue;
            }
            match pair.split_once(':') {
                Some((username, password))
                    if !username.trim().is_empty() && !password.trim().is_empty() =>
                {
                    accounts.push(Account::new(username.trim(), password.trim()));
                }
                _ => warn!("Skipping malformed allowed user entry #{}", index + 1),
            }
        }
        Self::new(accounts, case)
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case
    }

    /// Checks a username/password pair.
    ///
    /// Unknown users and wrong passwords both yield `InvalidCredentials`.
    /// Every account's password is compared so the time taken does not reveal
    /// whether the username exists.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Account, AuthFailure> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthFailure::MissingFields);
        }

        let wanted_user = self.case.normalize(username);
        let wanted_pass = self.case.normalize(password);

        let mut matched = None;
        for account in &self.accounts {
            let user_ok = self.case.normalize(account.username()) == wanted_user;
            let pass_ok = constant_time_eq(
                self.case.normalize(account.password()).as_bytes(),
                wanted_pass.as_bytes(),
            );
            if user_ok && pass_ok && matched.is_none() {
                matched = Some(account.clone());
            }
        }

        matched.ok_or(AuthFailure::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn store() -> CredentialStore {
        CredentialStore::parse("Admin:SenhaForte123, joao:pw1,maria : pw:with:colons", CaseSensitivity::Sensitive)
            .unwrap()
    }

    #[test]
    fn test_parse_preserves_order_and_trims() {
        let store = store();
        let names: Vec<&str> = store.accounts().iter().map(|a| a.username()).collect();
        assert_eq!(names, vec!["Admin", "joao", "maria"]);
        assert_eq!(store.accounts()[2].password(), "pw:with:colons");
    }

    #[test]
    fn test_parse_skips_incomplete_pairs() {
        let store =
            CredentialStore::parse("Admin:x,:nouser,nopass:,justname,,", CaseSensitivity::Sensitive)
                .unwrap();
        assert_eq!(store.accounts().len(), 1);
    }

    #[test]
    fn test_parse_rejects_empty_list() {
        assert_eq!(
            CredentialStore::parse("", CaseSensitivity::Sensitive).unwrap_err(),
            CredentialError::NoAccounts
        );
        assert_eq!(
            CredentialStore::parse("nocolon,:", CaseSensitivity::Sensitive).unwrap_err(),
            CredentialError::NoAccounts
        );
    }

    #[test]
    fn test_authenticate_valid_pairs() {
        let store = store();
        let admin = store.authenticate("Admin", "SenhaForte123").unwrap();
        assert_eq!(admin.role(), Role::Admin);
        let joao = store.authenticate("joao", "pw1").unwrap();
        assert_eq!(joao.role(), Role::User);
        assert!(store.authenticate("maria", "pw:with:colons").is_ok());
    }

    #[test]
    fn test_authenticate_rejects_unknown_and_wrong_password_identically() {
        let store = store();
        let unknown = store.authenticate("nobody", "SenhaForte123").unwrap_err();
        let wrong = store.authenticate("Admin", "wrong").unwrap_err();
        assert_eq!(unknown, AuthFailure::InvalidCredentials);
        assert_eq!(unknown, wrong);
    }

    #[test]
    fn test_authenticate_missing_fields() {
        let store = store();
        assert_eq!(
            store.authenticate("", "x").unwrap_err(),
            AuthFailure::MissingFields
        );
        assert_eq!(
            store.authenticate("   ", "x").unwrap_err(),
            AuthFailure::MissingFields
        );
        assert_eq!(
            store.authenticate("Admin", "").unwrap_err(),
            AuthFailure::MissingFields
        );
    }

    #[test]
    fn test_case_sensitive_by_default() {
        let store = store();
        assert_eq!(
            store.authenticate("admin", "SenhaForte123").unwrap_err(),
            AuthFailure::InvalidCredentials
        );
        assert_eq!(
            store.authenticate("Admin", "senhaforte123").unwrap_err(),
            AuthFailure::InvalidCredentials
        );
    }

    #[test]
    fn test_case_insensitive_applies_to_both_fields() {
        let store =
            CredentialStore::parse("Admin:SenhaForte123", CaseSensitivity::Insensitive).unwrap();
        let account = store.authenticate("ADMIN", "senhaforte123").unwrap();
        assert_eq!(account.username(), "Admin");
        assert_eq!(account.role(), Role::Admin);
    }
}
