//! Command execution against the wired services.

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use ag_app::usecases::{
    CardController, CardPorts, CreateListing, DriverTransport, ListReviews, ListingFeed,
    ManageMatches, MatchThread, OnboardingOrchestrator, RefreshOutcome, ReviewVerifications,
    RouteShell, SelectPlan, SendSms, SubmitReview,
};
use ag_core::card::ViewTarget;
use ag_core::filters::Filters;
use ag_core::ids::{DemandId, ListingId, MatchId, TransportId, UserId};
use ag_core::marketplace::{
    AssignDriver, Demand, DemandDraft, Match, MatchCommand, NewMatch, NewReview, Produce,
    ProduceDraft, SuggestionQuery, TransportOffer,
};
use ag_core::onboarding::{WizardEvent, WizardState, WizardStep};
use ag_core::realtime::LiveResource;
use ag_core::user::{Location, RoleSet, VerificationDecision};

use super::wiring::AppServices;
use crate::cli::{
    AdminCommands, CardArgs, Collection, Commands, CreateDemandArgs, CreateProduceArgs,
    MatchCommands, OnboardArgs, ReviewCommands, TransportCommands,
};
use crate::output::{print_frame, print_info, print_json, print_success};

/// Runs one command, then closes the realtime connection.
pub async fn run_command(command: Commands, services: AppServices) -> anyhow::Result<()> {
    let result = dispatch(command, &services).await;
    services.shutdown().await;
    result
}

async fn dispatch(command: Commands, services: &AppServices) -> anyhow::Result<()> {
    match command {
        Commands::Gate { path } => gate(services, &path).await,
        Commands::Onboard(args) => onboard(services, args).await,
        Commands::Plan { tier } => {
            let plan = SelectPlan::new(services.deps.users.clone(), services.gate.clone());
            let check = plan.execute(tier).await?;
            match check.outcome() {
                Some(outcome) => {
                    print_success(&format!("Plan set to {tier}"));
                    print_info(&format!("Continue at {}", outcome.destination()));
                }
                None => print_success(&format!("Plan set to {tier}")),
            }
            Ok(())
        }
        Commands::Browse {
            resource,
            filters,
            watch,
        } => {
            let filters = Filters::from_assignments(&filters)?;
            let deps = &services.deps;
            match resource {
                Collection::Produce => {
                    let feed = ListingFeed::<Produce>::new(deps.produce.clone(), deps.notifier.clone());
                    browse(services, feed, filters, watch).await
                }
                Collection::Demand => {
                    let feed = ListingFeed::<Demand>::new(deps.demands.clone(), deps.notifier.clone());
                    browse(services, feed, filters, watch).await
                }
                Collection::Transport => {
                    let feed = ListingFeed::<TransportOffer>::new(
                        deps.transport_offers.clone(),
                        deps.notifier.clone(),
                    );
                    browse(services, feed, filters, watch).await
                }
                Collection::Matches => {
                    let feed = ListingFeed::<Match>::new(deps.match_list.clone(), deps.notifier.clone());
                    browse(services, feed, filters, watch).await
                }
            }
        }
        Commands::CreateProduce(args) => create_produce(services, args).await,
        Commands::CreateDemand(args) => create_demand(services, args).await,
        Commands::Card(args) => card(services, args).await,
        Commands::Matches { command } => matches(services, command).await,
        Commands::Messages { match_id, send } => {
            let thread = MatchThread::new(services.deps.messages.clone());
            let match_id = MatchId::from(match_id);
            if let Some(content) = send {
                if thread.send(&match_id, &content).await?.is_none() {
                    bail!("message is empty");
                }
            }
            print_json(&thread.open(&match_id).await?)
        }
        Commands::Transport { command } => {
            let transport = DriverTransport::new(services.deps.transport.clone());
            match command {
                TransportCommands::Offers { driver } => {
                    print_json(&transport.offers_of(&UserId::from(driver)).await?)
                }
                TransportCommands::Suggest { match_id } => {
                    print_json(&transport.suggestions_for(&MatchId::from(match_id)).await?)
                }
            }
        }
        Commands::Review { command } => review(services, command).await,
        Commands::Sms { to, message } => {
            SendSms::new(services.deps.sms.clone())
                .execute(&to, &message)
                .await?;
            print_success(&format!("SMS sent to {to}"));
            Ok(())
        }
        Commands::Admin { command } => admin(services, command).await,
        Commands::Watch => watch(services).await,
        Commands::Config => {
            let mut config = services.config.clone();
            if config.session_token.is_some() {
                config.session_token = Some("<redacted>".to_string());
            }
            print_info(&format!("{config:#?}"));
            Ok(())
        }
    }
}

async fn current_roles(services: &AppServices) -> anyhow::Result<RoleSet> {
    let record = services
        .deps
        .users
        .current_user()
        .await
        .context("Failed to load your profile")?;
    Ok(record.roles)
}

async fn gate(services: &AppServices, path: &str) -> anyhow::Result<()> {
    let shell = RouteShell::new(services.gate.clone());
    for frame in shell.navigate(path).await {
        print_frame(&frame);
    }
    print_info(&format!("gate state: {:?}", services.gate.state()));
    Ok(())
}

fn resubmission_notice(retry_count: u32) -> String {
    format!(
        "Previous submission was rejected (attempt {})",
        retry_count.saturating_add(1)
    )
}

fn ensure_no_error(state: &WizardState) -> anyhow::Result<()> {
    match &state.error {
        Some(err) => Err(anyhow!("step {}: {err}", state.step.number())),
        None => Ok(()),
    }
}

async fn onboard(services: &AppServices, args: OnboardArgs) -> anyhow::Result<()> {
    let deps = &services.deps;
    let wizard = OnboardingOrchestrator::new(
        deps.users.clone(),
        deps.images.clone(),
        deps.notifier.clone(),
        services.verification_poll(),
    );

    let result = async {
        let state = wizard.resume().await;
        if let Some(retry) = state.resubmission_of {
            print_info(&resubmission_notice(retry));
        }

        if !matches!(state.step, WizardStep::Waiting { .. }) {
            let steps = [
                WizardEvent::SelectRole { role: args.role },
                WizardEvent::Continue,
                WizardEvent::SetName { name: args.name },
                WizardEvent::SetPhone { phone: args.phone },
                WizardEvent::SelectCounty {
                    county: Some(args.county),
                },
                WizardEvent::SelectSubcounty {
                    subcounty: args.subcounty,
                },
                WizardEvent::SelectTown { town: args.town },
                WizardEvent::Continue,
                WizardEvent::SetNationalId {
                    national_id: args.national_id,
                },
            ];

            for event in steps {
                let continues = matches!(event, WizardEvent::Continue);
                let state = wizard.dispatch(event).await;
                if continues {
                    ensure_no_error(&state)?;
                }
            }
            if let Some(path) = &args.id_image {
                wizard.attach_id_image(path).await?;
            }
            let state = wizard.dispatch(WizardEvent::Continue).await;
            ensure_no_error(&state)?;
        }

        let state = wizard.current();
        print_info(&format!("Onboarding at step {} ({:?})", state.step.number(), state.step));

        if args.wait {
            print_info("Waiting for verification... (Ctrl+C to stop)");
            loop {
                let decision = tokio::select! {
                    decision = wizard.next_decision() => decision,
                    _ = tokio::signal::ctrl_c() => None,
                };
                let Some(state) = decision else { break };
                print_info(&format!("Verification update: step {:?}", state.step));
                if !wizard.is_polling() {
                    break;
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    wizard.shutdown();
    result
}

async fn browse<R>(
    services: &AppServices,
    feed: ListingFeed<R>,
    filters: Filters,
    watch: bool,
) -> anyhow::Result<()>
where
    R: LiveResource + Serialize,
{
    match feed.apply_filters(filters).await {
        RefreshOutcome::Applied(count) => {
            info!(count, query = %feed.query_string(), "listing loaded");
            print_json(&feed.items())?;
        }
        RefreshOutcome::Failed(err) => bail!(err.user_message()),
        RefreshOutcome::Stale => {}
    }

    if !watch {
        return Ok(());
    }
    if !services.connect_realtime().await {
        bail!("live updates are unavailable");
    }

    print_info("Watching for updates... (Ctrl+C to stop)");
    let mut events = services.deps.realtime.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    if feed.apply_event(&event) {
                        print_info(&format!("{} ({} items)", event.name(), feed.items().len()));
                        if let Some(first) = feed.items().first() {
                            print_json(first)?;
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "watch lagged behind realtime events"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

async fn create_produce(services: &AppServices, args: CreateProduceArgs) -> anyhow::Result<()> {
    let roles = current_roles(services).await?;
    let draft = ProduceDraft {
        crop: args.crop,
        variety: args.variety,
        quantity: args.quantity,
        unit: args.unit,
        price_per_unit: args.price,
        location: Location::county(args.county),
        description: args.description,
        images: Vec::new(),
        harvest_date: args.harvest_date,
    };

    let create = CreateListing::<Produce>::new(
        services.deps.produce_writer.clone(),
        services.deps.images.clone(),
    );
    let created = create
        .execute(&roles, draft, args.images)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    print_success("Listing published");
    print_json(&created)
}

async fn create_demand(services: &AppServices, args: CreateDemandArgs) -> anyhow::Result<()> {
    let roles = current_roles(services).await?;
    let draft = DemandDraft {
        crop: args.crop,
        quantity: args.quantity,
        unit: args.unit,
        max_price_per_unit: args.max_price,
        location: Location::county(args.county),
        needed_by: args.needed_by,
        description: args.description,
    };

    let create = CreateListing::<Demand>::new(
        services.deps.demand_writer.clone(),
        services.deps.images.clone(),
    );
    let created = create
        .execute(&roles, draft, Vec::new())
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    print_success("Demand published");
    print_json(&created)
}

async fn card(services: &AppServices, args: CardArgs) -> anyhow::Result<()> {
    let deps = &services.deps;
    let view_target = match (&args.target.demand, &args.target.transport) {
        (Some(id), _) => Some(ViewTarget::Demand(DemandId::from(id.as_str()))),
        (None, Some(id)) => Some(ViewTarget::Transport(TransportId::from(id.as_str()))),
        (None, None) => None,
    };
    let match_id = args.target.match_id.as_deref().map(MatchId::from);
    if match_id.is_some() {
        services.connect_realtime().await;
    }

    let controller = CardController::new(
        CardPorts {
            demands: deps.demands.clone(),
            transport: deps.transport.clone(),
            messages: deps.messages.clone(),
            realtime: deps.realtime.clone(),
            notifier: deps.notifier.clone(),
        },
        view_target,
        match_id,
    );

    let span = info_span!("cli.card");
    async {
        controller.expand().await;

        if let Some(content) = &args.send {
            controller.send_message(content).await?;
        }
        print_json(&controller.thread())?;

        if args.follow {
            print_info("Following chat... (Ctrl+C to stop)");
            let cancel = CancellationToken::new();
            let events = deps.realtime.subscribe();
            tokio::select! {
                _ = controller.follow(events, cancel.clone()) => {}
                _ = tokio::signal::ctrl_c() => cancel.cancel(),
            }
            print_json(&controller.thread())?;
        }

        if let Err(err) = controller.mark_read().await {
            warn!(error = %err, "could not mark messages read");
        }
        controller.dispose().await;
        Ok::<(), anyhow::Error>(())
    }
    .instrument(span)
    .await
}

async fn matches(services: &AppServices, command: MatchCommands) -> anyhow::Result<()> {
    let manage = ManageMatches::new(services.deps.matches.clone());

    let (id, action) = match command {
        MatchCommands::Propose {
            listing,
            demand,
            quantity,
            price,
        } => {
            let roles = current_roles(services).await?;
            let created = manage
                .propose(
                    &roles,
                    NewMatch {
                        listing_id: ListingId::from(listing),
                        demand_id: DemandId::from(demand),
                        quantity,
                        agreed_price: price,
                    },
                )
                .await?;
            print_success("Match proposed");
            return print_json(&created);
        }
        MatchCommands::Suggest {
            demand,
            listing,
            limit,
        } => {
            let limit = limit.unwrap_or(services.config.suggestion_limit);
            let query = match (demand, listing) {
                (Some(demand), _) => SuggestionQuery::ForDemand {
                    demand_id: DemandId::from(demand),
                    limit,
                },
                (None, Some(listing)) => SuggestionQuery::ForListing {
                    listing_id: ListingId::from(listing),
                    limit,
                },
                (None, None) => bail!("either --demand or --listing is required"),
            };
            return print_json(&manage.suggestions(&query).await?);
        }
        MatchCommands::Accept { id } => (id, MatchCommand::Accept),
        MatchCommands::Cancel { id } => (id, MatchCommand::Cancel),
        MatchCommands::Complete { id } => (id, MatchCommand::Complete),
        MatchCommands::AssignDriver {
            id,
            driver,
            transport,
        } => (
            id,
            MatchCommand::AssignDriver(AssignDriver {
                driver_id: UserId::from(driver),
                transport_id: transport.map(TransportId::from),
            }),
        ),
    };

    let roles = current_roles(services).await?;
    let updated = manage.apply(&roles, &MatchId::from(id), action).await?;
    print_json(&updated)
}

async fn review(services: &AppServices, command: ReviewCommands) -> anyhow::Result<()> {
    let deps = &services.deps;
    match command {
        ReviewCommands::Submit {
            match_id,
            reviewee,
            rating,
            comment,
        } => {
            let review = SubmitReview::new(deps.reviews.clone())
                .execute(NewReview {
                    reviewee_id: UserId::from(reviewee),
                    match_id: MatchId::from(match_id),
                    rating,
                    comment,
                })
                .await?;
            print_success("Review submitted");
            print_json(&review)
        }
        ReviewCommands::User { id } => {
            let page = ListReviews::new(deps.reviews.clone(), deps.users.clone())
                .for_user(&UserId::from(id))
                .await?;
            print_json(&page)
        }
        ReviewCommands::Match { id } => {
            let reviews = ListReviews::new(deps.reviews.clone(), deps.users.clone())
                .for_match(&MatchId::from(id))
                .await?;
            print_json(&reviews)
        }
    }
}

async fn admin(services: &AppServices, command: AdminCommands) -> anyhow::Result<()> {
    let roles = current_roles(services).await?;
    let review = ReviewVerifications::new(services.deps.verification_admin.clone());
    match command {
        AdminCommands::Pending => print_json(&review.pending(&roles).await?),
        AdminCommands::Verify {
            user,
            approve,
            reject,
        } => {
            let decision = match (approve, reject) {
                (true, _) => VerificationDecision::approve(),
                (false, Some(reason)) => VerificationDecision::reject(reason),
                (false, None) => bail!("pass --approve or --reject <REASON>"),
            };
            let record = review.decide(&roles, &UserId::from(user), decision).await?;
            print_success(&format!("Verification set to {:?}", record.verification_status));
            Ok(())
        }
    }
}

async fn watch(services: &AppServices) -> anyhow::Result<()> {
    if !services.connect_realtime().await {
        bail!("live updates are unavailable");
    }
    let mut events = services.deps.realtime.subscribe();
    print_info("Watching realtime events... (Ctrl+C to stop)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    let scope = event
                        .match_id()
                        .map(|id| format!(" match={id}"))
                        .unwrap_or_default();
                    print_info(&format!("{}{scope}", event.name()));
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "watch lagged behind realtime events"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}
