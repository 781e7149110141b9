mod backup_roundtrip;
mod credential_roundtrip;
