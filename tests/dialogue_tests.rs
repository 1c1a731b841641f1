use anyhow::Result;

use pulseforge::dialogue::{transition, validate_search_query, Effect, MenuEvent, MenuState};
use pulseforge::session::{self, main_menu, replace_main_menu, MenuDialogue, SessionStorage};
use teloxide::types::{ChatId, MessageId};

/// Walk the whole menu from sport selection down to a match
#[tokio::test]
async fn test_menu_walk_forward() -> Result<()> {
    let steps = [
        ("sport_basketball", MenuState::SportChosen, Effect::ChooseSport("basketball".into())),
        ("region_america", MenuState::RegionChosen, Effect::ChooseRegion("america".into())),
        ("country_usa", MenuState::CountryChosen, Effect::ChooseCountry("usa".into())),
        ("league_12", MenuState::MatchList, Effect::ChooseLeague(12)),
        ("match_3901", MenuState::MatchDetail, Effect::ShowMatch(3901)),
    ];

    let dialogue = MenuDialogue::new(SessionStorage::new(), ChatId(100));
    for (data, expected_state, expected_effect) in steps {
        let event: MenuEvent = data.parse()?;
        let step = transition(session::load(&dialogue).await?.state, &event);
        assert_eq!(step.next, expected_state, "data: {data}");
        assert_eq!(step.effect, expected_effect, "data: {data}");
        session::set_state(&dialogue, step.next).await?;
    }
    Ok(())
}

/// `back` climbs one level at a time and ends at the sport menu
#[tokio::test]
async fn test_back_climbs_to_start() -> Result<()> {
    let mut state = MenuState::MatchDetail;
    let mut effects = Vec::new();
    while state != MenuState::Start {
        let step = transition(state, &MenuEvent::Back);
        effects.push(step.effect);
        state = step.next;
    }
    assert_eq!(
        effects,
        vec![Effect::ShowLeagues, Effect::ShowCountries, Effect::ShowRegions, Effect::ShowSports]
    );
    Ok(())
}

#[tokio::test]
async fn test_back_to_family() -> Result<()> {
    let cases = [
        ("back_to_start", MenuState::Start, Effect::ShowSports),
        ("back_to_sport", MenuState::SportChosen, Effect::ShowRegions),
        ("back_to_region", MenuState::RegionChosen, Effect::ShowCountries),
        ("back_to_country", MenuState::CountryChosen, Effect::ShowLeagues),
    ];
    for (data, state, effect) in cases {
        let step = transition(MenuState::MatchDetail, &data.parse()?);
        assert_eq!((step.next, step.effect), (state, effect), "data: {data}");
    }
    Ok(())
}

#[tokio::test]
async fn test_about_from_any_state() -> Result<()> {
    for from in [MenuState::Start, MenuState::CountryChosen, MenuState::TeamList] {
        let step = transition(from, &MenuEvent::About);
        assert_eq!(step.next, from);
        assert_eq!(step.effect, Effect::ShowAbout);
    }
    assert_eq!(transition(MenuState::About, &MenuEvent::Back).effect, Effect::ShowSports);
    Ok(())
}

#[tokio::test]
async fn test_stale_or_foreign_callback_is_ignored() -> Result<()> {
    let step = transition(MenuState::RegionChosen, &"edit_3".parse()?);
    assert_eq!(step.next, MenuState::RegionChosen);
    assert_eq!(step.effect, Effect::Ignore);
    Ok(())
}

#[tokio::test]
async fn test_main_menu_tracking_is_per_chat() -> Result<()> {
    let storage = SessionStorage::new();
    let first = MenuDialogue::new(storage.clone(), ChatId(1));
    let second = MenuDialogue::new(storage.clone(), ChatId(2));
    replace_main_menu(&first, MessageId(10)).await?;
    replace_main_menu(&second, MessageId(20)).await?;

    assert_eq!(main_menu(&storage, ChatId(1)).await, Some(MessageId(10)));
    assert_eq!(replace_main_menu(&first, MessageId(11)).await?, Some(MessageId(10)));
    assert_eq!(main_menu(&storage, ChatId(2)).await, Some(MessageId(20)));
    Ok(())
}

#[tokio::test]
async fn test_search_query_validation() -> Result<()> {
    assert!(validate_search_query("NBA").is_ok());
    assert_eq!(validate_search_query(" hi "), Err("too_short"));
    assert_eq!(validate_search_query(""), Err("too_short"));
    Ok(())
}
