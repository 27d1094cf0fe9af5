use crate::error::AppError;
use crate::models::fix::GpsFix;
use crate::state::AppState;

pub async fn enqueue_fix(state: &AppState, fix: GpsFix) -> Result<(), AppError> {
    state
        .fix_tx
        .send(fix)
        .await
        .map_err(|err| AppError::Internal(format!("fix queue send failed: {err}")))?;

    state.metrics.fixes_in_queue.inc();
    Ok(())
}
