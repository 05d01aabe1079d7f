use crate::types::Bytes32;

/// Lifecycle events the wallet can be asked to observe. Grounded on the
/// teacher's minimal `WalletEvent` enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLayerEvent {
    LauncherTracked {
        launcher_id: Bytes32,
    },
    SingletonConfirmed {
        launcher_id: Bytes32,
        coin_id: Bytes32,
        generation: u32,
    },
    SingletonMelted {
        launcher_id: Bytes32,
    },
    RebaseAttempted {
        launcher_id: Bytes32,
        succeeded: bool,
    },
}
