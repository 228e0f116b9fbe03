//! Statically declared transformation profiles.
//!
//! Each resource type the client exchanges with the backend declares which
//! of its fields are dates, numbers or booleans, and which fields never
//! cross the wire. Profiles are addressed through the closed [`Resource`]
//! enum, so an unknown profile name is a compile error rather than a
//! runtime lookup failure.
//!
//! Field names are declared in the application's camelCase convention; the
//! pipelines translate them to the active key convention as needed.

/// Output convention for date fields on the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// RFC 3339 / ISO-8601 timestamp string, second precision, UTC.
    Iso8601,
    /// Unix epoch milliseconds, as a string.
    EpochMillis,
    /// Token-substitution pattern supporting `YYYY`, `MM`, `DD`, `HH`,
    /// `mm` and `ss`.
    Pattern(&'static str),
}

/// Field-level transformation rules for one resource type.
#[derive(Debug, Clone, Copy)]
pub struct TransformProfile {
    /// Fields carrying date values.
    pub date_fields: &'static [&'static str],
    /// Fields coerced through numeric parsing.
    pub number_fields: &'static [&'static str],
    /// Fields coerced to booleans.
    pub boolean_fields: &'static [&'static str],
    /// Fields removed before the payload leaves the client.
    pub exclude_fields: &'static [&'static str],
    /// When non-empty, the only fields kept (applied after exclusion).
    pub include_fields: &'static [&'static str],
    /// Wire format for date fields.
    pub date_format: DateFormat,
    /// Whether null-valued keys are stripped from outgoing payloads.
    pub strip_nulls: bool,
}

/// The closed set of resource types with declared profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Platform users (login, registration, profile updates).
    User,
    /// Sales and purchase invoices.
    Invoice,
    /// Ledger accounts.
    Account,
    /// Bank and ledger transactions.
    Transaction,
}

impl Resource {
    /// The transformation profile for this resource type.
    #[must_use]
    pub const fn profile(self) -> &'static TransformProfile {
        match self {
            Self::User => &USER,
            Self::Invoice => &INVOICE,
            Self::Account => &ACCOUNT,
            Self::Transaction => &TRANSACTION,
        }
    }
}

static USER: TransformProfile = TransformProfile {
    date_fields: &["createdAt", "updatedAt", "lastLoginAt"],
    number_fields: &[],
    boolean_fields: &["isActive", "isStaff", "emailVerified"],
    exclude_fields: &["password", "passwordConfirm"],
    include_fields: &[],
    date_format: DateFormat::Iso8601,
    strip_nulls: true,
};

static INVOICE: TransformProfile = TransformProfile {
    date_fields: &["issueDate", "dueDate", "paidAt", "createdAt", "updatedAt"],
    number_fields: &["subtotal", "taxAmount", "totalAmount", "amountDue"],
    boolean_fields: &["isPaid", "isOverdue", "isRecurring"],
    exclude_fields: &["internalNotes"],
    include_fields: &[],
    date_format: DateFormat::Iso8601,
    strip_nulls: true,
};

static ACCOUNT: TransformProfile = TransformProfile {
    date_fields: &["openedAt", "createdAt", "updatedAt"],
    number_fields: &["balance", "openingBalance"],
    boolean_fields: &["isArchived", "isReconcilable"],
    exclude_fields: &[],
    include_fields: &[],
    date_format: DateFormat::Iso8601,
    strip_nulls: true,
};

static TRANSACTION: TransformProfile = TransformProfile {
    date_fields: &["bookedAt", "valueDate", "createdAt"],
    number_fields: &["amount", "runningBalance", "exchangeRate"],
    boolean_fields: &["isReconciled", "isPending"],
    exclude_fields: &[],
    include_fields: &[],
    date_format: DateFormat::Iso8601,
    strip_nulls: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_has_a_profile() {
        for resource in [Resource::User, Resource::Invoice, Resource::Account, Resource::Transaction]
        {
            let profile = resource.profile();
            assert!(!profile.date_fields.is_empty() || !profile.boolean_fields.is_empty());
        }
    }

    #[test]
    fn credentials_never_cross_the_wire() {
        assert!(Resource::User.profile().exclude_fields.contains(&"password"));
    }
}
