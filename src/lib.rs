pub mod stamp_sync_sdk;
