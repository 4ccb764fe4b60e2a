//! # Roster Core
//!
//! Identity, realm topology and host collaborator traits shared by the
//! roster friends-list synchronizer.
//!
//! ## Key Types
//!
//! - [`PlayerKey`]: canonical `name-realm` identity used as the only map key
//! - [`PlayerRecord`]: a resolved player with its locality
//! - [`RealmTopology`]: session-cached current realm and connected realms
//! - [`RealmGroup`]: sorted realm list identifying a group in storage
//!
//! ## Key Traits
//!
//! - [`FriendsApi`]: the game client's friends list
//! - [`RealmInfo`]: the game client's realm information
//! - [`ChangeNotifications`]: suspend/resume of friends-list-changed events

pub mod error;
pub mod host;
pub mod identity;
pub mod mock;
pub mod realm;

pub use error::{RosterError, RosterResult};
pub use host::{ChangeNotifications, FriendInfo, FriendsApi, RealmInfo};
pub use identity::{PlayerKey, PlayerRecord};
pub use mock::{MockFriendsApi, RecordingNotifications, StaticRealmInfo};
pub use realm::{RealmGroup, RealmTopology, normalize_realm};
