//! Named editor-layout snapshots ("workviews") for an editor host.
//! 編輯器版面快照（工作檢視）的核心模組。

mod serde_keyed;

pub mod clock;
pub mod codec;
pub mod error;
pub mod host;
pub mod model;
pub mod ordering;
pub mod store;
pub mod tree;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{decode_state, decode_state_or_default, encode_state, PersistedState};
pub use error::{CodecError, HostError, WorkviewError};
pub use host::WorkviewsHost;
pub use model::{
    Document, Editor, ListedDocument, OpenEditor, Workview, WorkviewId, DEFAULT_VIEW_COLUMN,
};
pub use ordering::{compare_titles, restore_key, restore_plan, uri_basename};
pub use store::WorkviewStore;
pub use tree::{Collapsible, TreeCommand, TreeItem, TreeNode};
pub use workviews_settings::WorkviewsPreferences;
