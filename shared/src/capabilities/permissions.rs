use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone)]
pub struct Permissions<E> {
    context: CapabilityContext<PermissionOperation, E>,
}

impl<Ev> Capability<Ev> for Permissions<Ev> {
    type Operation = PermissionOperation;
    type MappedSelf<MappedEv> = Permissions<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Permissions::new(self.context.map_event(f))
    }
}

impl<E> Permissions<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<PermissionOperation, E>) -> Self {
        Self { context }
    }

    /// Reads the current status without prompting.
    pub fn check<F>(&self, capability: DeviceCapability, callback: F)
    where
        F: FnOnce(PermissionState) -> E + Send + 'static,
        E: Send,
    {
        self.resolve_single(PermissionOperation::Check { capability }, callback);
    }

    /// Prompts the user if the platform still allows it.
    pub fn request<F>(&self, capability: DeviceCapability, callback: F)
    where
        F: FnOnce(PermissionState) -> E + Send + 'static,
        E: Send,
    {
        self.resolve_single(PermissionOperation::Request { capability }, callback);
    }

    pub fn check_multiple<F>(&self, capabilities: Vec<DeviceCapability>, callback: F)
    where
        F: FnOnce(PermissionState) -> E + Send + 'static,
        E: Send,
    {
        self.resolve_multiple(PermissionOperation::CheckMultiple { capabilities }, callback);
    }

    pub fn request_multiple<F>(&self, capabilities: Vec<DeviceCapability>, callback: F)
    where
        F: FnOnce(PermissionState) -> E + Send + 'static,
        E: Send,
    {
        self.resolve_multiple(
            PermissionOperation::RequestMultiple { capabilities },
            callback,
        );
    }

    /// Sends the user to the system settings page for this app.
    pub fn open_settings(&self)
    where
        E: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(PermissionOperation::OpenSettings).await;
        });
    }

    fn resolve_single<F>(&self, operation: PermissionOperation, callback: F)
    where
        F: FnOnce(PermissionState) -> E + Send + 'static,
        E: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(output.single()));
        });
    }

    fn resolve_multiple<F>(&self, operation: PermissionOperation, callback: F)
    where
        F: FnOnce(PermissionState) -> E + Send + 'static,
        E: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(output.aggregate()));
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCapability {
    Camera,
    PhotoLibrary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PermissionOperation {
    Check { capability: DeviceCapability },
    Request { capability: DeviceCapability },
    CheckMultiple { capabilities: Vec<DeviceCapability> },
    RequestMultiple { capabilities: Vec<DeviceCapability> },
    OpenSettings,
}

impl Operation for PermissionOperation {
    type Output = PermissionOutput;
}

/// Raw status as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformPermission {
    Granted,
    Denied,
    Blocked,
    Limited,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionOutput {
    Status(PlatformPermission),
    Statuses(Vec<PlatformPermission>),
    Failed(PermissionError),
}

impl PermissionOutput {
    /// Collapses a single-permission answer into the three states the form
    /// acts on. Anything unexpected is treated as blocked.
    pub fn single(&self) -> PermissionState {
        match self {
            Self::Status(status) => PermissionState::from_platform(*status),
            Self::Statuses(statuses) if statuses.len() == 1 => {
                PermissionState::from_platform(statuses[0])
            }
            Self::Statuses(_) => {
                tracing::warn!("single permission query answered with a batch");
                PermissionState::Blocked
            }
            Self::Failed(err) => {
                tracing::warn!(error = %err, "permission query failed");
                PermissionState::Blocked
            }
        }
    }

    pub fn aggregate(&self) -> PermissionState {
        match self {
            Self::Status(status) => PermissionState::from_platform(*status),
            Self::Statuses(statuses) => PermissionState::aggregate(
                statuses.iter().copied().map(PermissionState::from_platform),
            ),
            Self::Failed(err) => {
                tracing::warn!(error = %err, "permission batch query failed");
                PermissionState::Blocked
            }
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PermissionError {
    #[error("permission API unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("permission query failed: {reason}")]
    QueryFailed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionState {
    Granted,
    /// Not granted, but the platform will still show the prompt.
    Denied,
    /// Not granted and the prompt will not be shown again.
    Blocked,
}

impl PermissionState {
    pub const fn from_platform(status: PlatformPermission) -> Self {
        match status {
            PlatformPermission::Granted => Self::Granted,
            PlatformPermission::Denied => Self::Denied,
            PlatformPermission::Blocked
            | PlatformPermission::Limited
            | PlatformPermission::Unavailable => Self::Blocked,
        }
    }

    /// Granted only if every member is granted; any denial wins over blocked
    /// because it can still be requested. An empty set counts as blocked.
    pub fn aggregate(states: impl IntoIterator<Item = Self>) -> Self {
        let mut any = false;
        let mut all_granted = true;
        let mut any_denied = false;
        for state in states {
            any = true;
            match state {
                Self::Granted => {}
                Self::Denied => {
                    all_granted = false;
                    any_denied = true;
                }
                Self::Blocked => all_granted = false,
            }
        }

        if !any {
            Self::Blocked
        } else if all_granted {
            Self::Granted
        } else if any_denied {
            Self::Denied
        } else {
            Self::Blocked
        }
    }

    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::PermissionState::{Blocked, Denied, Granted};

    #[test]
    fn platform_statuses_collapse_to_three_states() {
        assert_eq!(PermissionState::from_platform(PlatformPermission::Granted), Granted);
        assert_eq!(PermissionState::from_platform(PlatformPermission::Denied), Denied);
        assert_eq!(PermissionState::from_platform(PlatformPermission::Blocked), Blocked);
        assert_eq!(PermissionState::from_platform(PlatformPermission::Limited), Blocked);
        assert_eq!(
            PermissionState::from_platform(PlatformPermission::Unavailable),
            Blocked
        );
    }

    #[test]
    fn aggregate_rules() {
        assert_eq!(PermissionState::aggregate([Granted, Granted]), Granted);
        assert_eq!(PermissionState::aggregate([Granted, Denied, Blocked]), Denied);
        assert_eq!(PermissionState::aggregate([Granted, Blocked]), Blocked);
        assert_eq!(PermissionState::aggregate(Vec::new()), Blocked);
    }

    #[test]
    fn failures_are_treated_as_blocked() {
        let output = PermissionOutput::Failed(PermissionError::QueryFailed {
            reason: "boom".into(),
        });
        assert_eq!(output.single(), Blocked);
        assert_eq!(output.aggregate(), Blocked);
    }

    #[test]
    fn batch_output_aggregates() {
        let output = PermissionOutput::Statuses(vec![
            PlatformPermission::Granted,
            PlatformPermission::Denied,
        ]);
        assert_eq!(output.aggregate(), Denied);
        assert_eq!(output.single(), Blocked);
    }
}
