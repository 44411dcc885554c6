//! Stun timers.

use bevy::prelude::*;

use crate::combat::Stunned;

/// System: tick stun timers, remove `Stunned` when it runs out.
pub fn tick_stuns(mut commands: Commands, mut stunned: Query<(Entity, &mut Stunned)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (entity, mut stun) in stunned.iter_mut() {
        stun.remaining -= delta;

        if !stun.is_stunned() {
            commands.entity(entity).remove::<Stunned>();
            crate::logger::log(&format!("✨ {:?} recovered from stun", entity));
        }
    }
}
