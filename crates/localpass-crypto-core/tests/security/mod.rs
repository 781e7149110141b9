mod audit_verification;
mod entropy_quality;
mod mlock_verification;
mod timing_sidechannel;
