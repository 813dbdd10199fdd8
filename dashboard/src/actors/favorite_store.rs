use std::collections::HashSet;
use std::sync::Arc;

use actix::fut::wrap_future;
use actix::prelude::*;
use colored::Color;

use common::logger::Logger;
use common::messages::{FavoriteSnapshot, FavoritesChanged, LoadFavorites, ToggleFavorite};
use common::session::SessionContext;
use common::types::errors::FavoriteError;
use common::types::restaurant::RestaurantId;

use crate::api::RestaurantBackend;

/// Actor `FavoriteStore`: única fuente de verdad de la membresía de
/// favoritos de la sesión actual.
///
/// El toggle es optimista: el estado local cambia de inmediato, el
/// backend confirma en segundo plano y una falla revierte el cambio
/// avisando al sink. Toda mutación pasa por acá; el resto del sistema
/// solo lee snapshots.
pub struct FavoriteStore {
    api: Arc<dyn RestaurantBackend>,
    session: SessionContext,
    membership: HashSet<RestaurantId>,
    sink: Recipient<FavoritesChanged>,
    logger: Logger,
}

impl FavoriteStore {
    pub fn new(
        api: Arc<dyn RestaurantBackend>,
        session: SessionContext,
        sink: Recipient<FavoritesChanged>,
    ) -> Self {
        Self {
            api,
            session,
            membership: HashSet::new(),
            sink,
            logger: Logger::new("Favorite Store", Color::Yellow),
        }
    }
}

impl Actor for FavoriteStore {
    type Context = Context<Self>;
}

impl Handler<LoadFavorites> for FavoriteStore {
    type Result = ResponseActFuture<Self, Result<usize, FavoriteError>>;

    fn handle(&mut self, msg: LoadFavorites, _ctx: &mut Self::Context) -> Self::Result {
        if !self.session.is_authenticated() {
            self.logger.warn("Favorites requested without a session");
            return Box::pin(actix::fut::ready(Err(FavoriteError::Unauthenticated)));
        }

        let api = self.api.clone();
        let session = self.session.clone();
        let fut = wrap_future::<_, Self>(async move { api.favorites(&session, msg.position).await })
            .map(|result, act, _ctx| match result {
                Ok(favorites) => {
                    act.membership = favorites.iter().map(|r| r.id()).collect();
                    act.logger
                        .info(format!("Loaded {} favorites", act.membership.len()));
                    Ok(act.membership.len())
                }
                Err(err) => {
                    act.logger.error(format!("Failed to load favorites: {}", err));
                    Err(FavoriteError::ToggleFailed)
                }
            });
        Box::pin(fut)
    }
}

impl Handler<ToggleFavorite> for FavoriteStore {
    type Result = ();

    fn handle(&mut self, msg: ToggleFavorite, ctx: &mut Self::Context) {
        let id = msg.id;

        if !self.session.is_authenticated() {
            self.sink.do_send(FavoritesChanged {
                id,
                now_favorite: self.membership.contains(&id),
                rolled_back: false,
                error: Some(FavoriteError::Unauthenticated),
            });
            return;
        }

        // Flip optimista: primero el estado local, después el backend.
        let adding = !self.membership.contains(&id);
        if adding {
            self.membership.insert(id);
        } else {
            self.membership.remove(&id);
        }
        self.sink.do_send(FavoritesChanged {
            id,
            now_favorite: adding,
            rolled_back: false,
            error: None,
        });

        let api = self.api.clone();
        let session = self.session.clone();
        let fut = wrap_future::<_, Self>(async move {
            if adding {
                api.add_favorite(&session, id).await
            } else {
                api.remove_favorite(&session, id).await
            }
        })
        .map(move |result, act, _ctx| {
            if let Err(err) = result {
                act.logger
                    .error(format!("Favorite toggle for {} failed: {}", id, err));
                // Revertir solo si nadie volvió a togglear mientras tanto.
                if act.membership.contains(&id) == adding {
                    if adding {
                        act.membership.remove(&id);
                    } else {
                        act.membership.insert(id);
                    }
                    act.sink.do_send(FavoritesChanged {
                        id,
                        now_favorite: !adding,
                        rolled_back: true,
                        error: Some(FavoriteError::ToggleFailed),
                    });
                }
            }
        });
        ctx.spawn(fut);
    }
}

impl Handler<FavoriteSnapshot> for FavoriteStore {
    type Result = MessageResult<FavoriteSnapshot>;

    fn handle(&mut self, _msg: FavoriteSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.membership.clone())
    }
}
