//! 集成测试公共设施
//!
//! 进程内的模拟游戏平台（axum），行为与真实平台的响应格式一致：
//! 平台 API 返回 `Response/ErrorCode/ErrorStatus/Message` 信封，
//! 定义表内容主机返回裸 JSON，错误时使用小写 `message`。

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use season_shared::config::PlatformConfig;

// ==================== 测试数据 ====================

pub const API_KEY: &str = "test-api-key";
pub const MEMBERSHIP_ID: &str = "4611686018400000001";
pub const MEMBERSHIP_TYPE: i32 = 3;

pub const CHARACTER_1: &str = "2305843009300000001";
pub const CHARACTER_2: &str = "2305843009300000002";

pub const SEASON_HASH: u32 = 1001;
pub const SEASON_PASS_HASH: u32 = 2001;
pub const REWARD_TRACK: u32 = 3001;
pub const PRESTIGE_TRACK: u32 = 3002;

pub const ENGRAM: u32 = 5001;
pub const BRIGHT_DUST: u32 = 5002;
pub const UPGRADE_MODULE: u32 = 5003;
pub const MISSING_ITEM: u32 = 9999;

pub const TABLES: [&str; 4] = [
    "DestinyProgressionDefinition",
    "DestinyInventoryItemDefinition",
    "DestinySeasonDefinition",
    "DestinySeasonPassDefinition",
];

/// 领取接口的模拟行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimMode {
    /// 正常领取并标记为已领取
    Accept,
    /// 正常领取，成功信封的 Response 为 null
    AcceptWithoutPayload,
    /// 500 + DestinyRewardAlreadyClaimed
    AlreadyClaimed,
    /// 500 + DestinyRewardNotEarned
    NotEarned,
    /// 503 纯文本
    Unavailable,
}

/// 一个角色在一条轨道上的状态
#[derive(Debug, Clone)]
pub struct FakeProgression {
    pub current_progress: i64,
    pub reward_item_states: Vec<u32>,
}

#[derive(Debug)]
pub struct FakeState {
    pub version: String,
    pub tables: HashMap<String, Value>,
    /// 这些表返回 404 + 小写 message
    pub missing_tables: HashSet<String>,
    /// 角色 ID -> 轨道 hash -> 状态
    pub characters: BTreeMap<String, BTreeMap<u32, FakeProgression>>,
    pub claim_mode: ClaimMode,
    /// 档案接口返回 401
    pub require_sign_in: bool,
    /// 清单接口返回 2xx 但 ErrorCode 表示维护中
    pub maintenance: bool,

    // 请求记录
    pub manifest_requests: usize,
    pub table_requests: usize,
    pub profile_requests: usize,
    pub claim_bodies: Vec<Value>,
    pub last_api_key: Option<String>,
    pub last_csrf: Option<String>,
    pub last_components: Option<String>,
    pub content_saw_api_key: bool,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            tables: default_tables(),
            missing_tables: HashSet::new(),
            characters: default_characters(),
            claim_mode: ClaimMode::Accept,
            require_sign_in: false,
            maintenance: false,
            manifest_requests: 0,
            table_requests: 0,
            profile_requests: 0,
            claim_bodies: Vec::new(),
            last_api_key: None,
            last_csrf: None,
            last_components: None,
            content_saw_api_key: false,
        }
    }
}

/// 赛季 20：奖励轨道每级 100 点
///
/// | 下标 | 物品 | 数量 | 等级 | 门槛 |
/// |------|------|------|------|------|
/// | 0 | 异域印痕 | 1 | 1 | 0 |
/// | 1 | 光尘 | 50 | 2 | 100 |
/// | 2 | 升级模块 | 1 | 3 | 200 |
/// | 3 | （缺失物品） | 1 | 2 | 100 |
pub fn default_tables() -> HashMap<String, Value> {
    let steps: Vec<Value> = (0..10).map(|_| json!({"progressTotal": 100})).collect();
    HashMap::from([
        (
            TABLES[0].to_string(),
            json!({
                REWARD_TRACK.to_string(): {
                    "hash": REWARD_TRACK,
                    "displayProperties": {"name": "Season Pass Rank"},
                    "steps": steps,
                    "rewardItems": [
                        {"itemHash": ENGRAM, "quantity": 1, "rewardedAtProgressionLevel": 1},
                        {"itemHash": BRIGHT_DUST, "quantity": 50, "rewardedAtProgressionLevel": 2},
                        {"itemHash": UPGRADE_MODULE, "quantity": 1, "rewardedAtProgressionLevel": 3},
                        {"itemHash": MISSING_ITEM, "quantity": 1, "rewardedAtProgressionLevel": 2}
                    ]
                },
                PRESTIGE_TRACK.to_string(): {
                    "hash": PRESTIGE_TRACK,
                    "displayProperties": {"name": "Season Pass Prestige"},
                    "steps": [{"progressTotal": 100000}],
                    "rewardItems": [
                        {"itemHash": BRIGHT_DUST, "quantity": 100, "rewardedAtProgressionLevel": 1}
                    ]
                }
            }),
        ),
        (
            TABLES[1].to_string(),
            json!({
                ENGRAM.to_string(): {
                    "hash": ENGRAM,
                    "displayProperties": {"name": "Exotic Engram", "icon": "/img/engram.jpg"},
                    "itemTypeDisplayName": "Exotic Engram",
                    "itemType": 8,
                    "inventory": {"tierType": 6}
                },
                BRIGHT_DUST.to_string(): {
                    "hash": BRIGHT_DUST,
                    "displayProperties": {"name": "Bright Dust"},
                    "itemTypeDisplayName": "Currency",
                    "itemType": 1,
                    "inventory": {"tierType": 3}
                },
                UPGRADE_MODULE.to_string(): {
                    "hash": UPGRADE_MODULE,
                    "displayProperties": {"name": "Upgrade Module"},
                    "itemTypeDisplayName": "Material",
                    "itemType": 10,
                    "inventory": {"tierType": 5}
                }
            }),
        ),
        (
            TABLES[2].to_string(),
            json!({
                SEASON_HASH.to_string(): {
                    "hash": SEASON_HASH,
                    "displayProperties": {"name": "Season of the Deep"},
                    "seasonNumber": 21,
                    "seasonPassHash": SEASON_PASS_HASH
                }
            }),
        ),
        (
            TABLES[3].to_string(),
            json!({
                SEASON_PASS_HASH.to_string(): {
                    "hash": SEASON_PASS_HASH,
                    "rewardProgressionHash": REWARD_TRACK,
                    "prestigeProgressionHash": PRESTIGE_TRACK
                }
            }),
        ),
    ])
}

/// 角色 1：进度 150，已领取下标 0；角色 2：进度 250，未领取任何奖励
///
/// 预期未领取：角色 1 下标 1；角色 2 下标 0、1、2。
/// 两个角色的下标 3 都引用缺失物品。
pub fn default_characters() -> BTreeMap<String, BTreeMap<u32, FakeProgression>> {
    BTreeMap::from([
        (
            CHARACTER_1.to_string(),
            BTreeMap::from([(
                REWARD_TRACK,
                FakeProgression {
                    current_progress: 150,
                    reward_item_states: vec![4, 8, 0, 8],
                },
            )]),
        ),
        (
            CHARACTER_2.to_string(),
            BTreeMap::from([
                (
                    REWARD_TRACK,
                    FakeProgression {
                        current_progress: 250,
                        reward_item_states: vec![8, 8, 8, 8],
                    },
                ),
                (
                    PRESTIGE_TRACK,
                    FakeProgression {
                        current_progress: 0,
                        reward_item_states: vec![4],
                    },
                ),
            ]),
        ),
    ])
}

// ==================== 模拟平台 ====================

pub type SharedState = Arc<RwLock<FakeState>>;

pub struct FakePlatform {
    pub addr: SocketAddr,
    pub state: SharedState,
}

impl FakePlatform {
    pub async fn start() -> Self {
        Self::start_with(FakeState::default()).await
    }

    pub async fn start_with(state: FakeState) -> Self {
        let state = Arc::new(RwLock::new(state));
        let app = routes().with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            base_url: self.base_url(),
            content_base_url: self.base_url(),
            api_key: Some(API_KEY.to_string()),
            csrf_token: Some("csrf-token".to_string()),
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    pub async fn set_claim_mode(&self, mode: ClaimMode) {
        self.state.write().await.claim_mode = mode;
    }

    pub async fn set_progress(&self, character_id: &str, progression_hash: u32, progress: i64) {
        let mut state = self.state.write().await;
        if let Some(track) = state
            .characters
            .get_mut(character_id)
            .and_then(|c| c.get_mut(&progression_hash))
        {
            track.current_progress = progress;
        }
    }
}

fn routes() -> Router<SharedState> {
    Router::new()
        .route("/Platform/Destiny2/Manifest/", get(manifest))
        .route("/content/{file}", get(content))
        .route(
            "/Platform/Destiny2/{membership_type}/Profile/{membership_id}/",
            get(profile),
        )
        .route(
            "/Platform/Destiny2/Actions/Seasons/ClaimReward/",
            post(claim_reward),
        )
        .route(
            "/Platform/User/GetMembershipsForCurrentUser/",
            get(memberships),
        )
}

fn envelope(response: Value) -> Json<Value> {
    Json(json!({
        "Response": response,
        "ErrorCode": 1,
        "ThrottleSeconds": 0,
        "ErrorStatus": "Success",
        "Message": "Ok",
        "MessageData": {}
    }))
}

fn platform_error(status: StatusCode, code: i64, error_status: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "ErrorCode": code,
            "ThrottleSeconds": 0,
            "ErrorStatus": error_status,
            "Message": message,
            "MessageData": {}
        })),
    )
        .into_response()
}

fn record_session_headers(state: &mut FakeState, headers: &HeaderMap) {
    state.last_api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.last_csrf = headers
        .get("x-csrf")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
}

async fn manifest(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.write().await;
    state.manifest_requests += 1;
    record_session_headers(&mut state, &headers);

    if state.maintenance {
        return platform_error(
            StatusCode::OK,
            5,
            "SystemDisabled",
            "This system is temporarily disabled for maintenance.",
        );
    }

    let paths: serde_json::Map<String, Value> = TABLES
        .iter()
        .map(|t| (t.to_string(), json!(format!("/content/{}-{}.json", t, state.version))))
        .collect();

    envelope(json!({
        "version": state.version,
        "jsonWorldComponentContentPaths": {"en": paths}
    }))
    .into_response()
}

async fn content(
    State(state): State<SharedState>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    state.table_requests += 1;
    if headers.contains_key("x-api-key") {
        state.content_saw_api_key = true;
    }

    let table = file
        .trim_end_matches(".json")
        .rsplit_once('-')
        .map(|(name, _)| name.to_string())
        .unwrap_or_default();

    if state.missing_tables.contains(&table) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("{} is not published", table)})),
        )
            .into_response();
    }

    match state.tables.get(&table) {
        Some(value) => Json(value.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn profile(
    State(state): State<SharedState>,
    Path((membership_type, membership_id)): Path<(i32, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    state.profile_requests += 1;
    state.last_components = query.get("components").cloned();
    record_session_headers(&mut state, &headers);

    if state.require_sign_in {
        return platform_error(
            StatusCode::UNAUTHORIZED,
            99,
            "WebAuthRequired",
            "Please sign-in to continue.",
        );
    }
    if membership_type != MEMBERSHIP_TYPE || membership_id != MEMBERSHIP_ID {
        return platform_error(
            StatusCode::OK,
            1601,
            "DestinyAccountNotFound",
            "We were unable to find your Destiny account information.",
        );
    }

    let characters: serde_json::Map<String, Value> = state
        .characters
        .keys()
        .enumerate()
        .map(|(i, id)| {
            (
                id.clone(),
                json!({
                    "characterId": id,
                    "membershipId": MEMBERSHIP_ID,
                    "membershipType": MEMBERSHIP_TYPE,
                    "classType": i % 3,
                    "light": 1810,
                    "dateLastPlayed": "2024-05-01T20:00:00Z"
                }),
            )
        })
        .collect();

    let progressions: serde_json::Map<String, Value> = state
        .characters
        .iter()
        .map(|(id, tracks)| {
            let tracks: serde_json::Map<String, Value> = tracks
                .iter()
                .map(|(hash, track)| {
                    (
                        hash.to_string(),
                        json!({
                            "progressionHash": hash,
                            "level": 1,
                            "currentProgress": track.current_progress,
                            "rewardItemStates": track.reward_item_states
                        }),
                    )
                })
                .collect();
            (id.clone(), json!({"progressions": tracks}))
        })
        .collect();

    envelope(json!({
        "characters": {"privacy": 1, "data": characters},
        "characterProgressions": {"privacy": 2, "data": progressions}
    }))
    .into_response()
}

async fn claim_reward(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    record_session_headers(&mut state, &headers);
    state.claim_bodies.push(body.clone());

    match state.claim_mode {
        ClaimMode::AlreadyClaimed => {
            return platform_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                1657,
                "DestinyRewardAlreadyClaimed",
                "This reward has already been claimed.",
            );
        }
        ClaimMode::NotEarned => {
            return platform_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                1656,
                "DestinyRewardNotEarned",
                "This reward has not been earned yet.",
            );
        }
        ClaimMode::Unavailable => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::CONTENT_TYPE, "text/html")],
                "<html>upstream unavailable</html>",
            )
                .into_response();
        }
        ClaimMode::Accept | ClaimMode::AcceptWithoutPayload => {}
    }
    let payload = if state.claim_mode == ClaimMode::AcceptWithoutPayload {
        Value::Null
    } else {
        json!([{"itemHash": 0, "quantity": 1}])
    };

    let character_id = body["characterId"].as_str().unwrap_or_default().to_string();
    let progression_hash = body["progressionHash"].as_u64().unwrap_or_default() as u32;
    let reward_index = body["rewardIndex"].as_u64().unwrap_or_default() as usize;

    let Some(track) = state
        .characters
        .get_mut(&character_id)
        .and_then(|c| c.get_mut(&progression_hash))
    else {
        return platform_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            1623,
            "DestinyCharacterNotFound",
            "Character not found.",
        );
    };

    match track.reward_item_states.get_mut(reward_index) {
        Some(bits) if *bits & 4 != 0 => platform_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            1657,
            "DestinyRewardAlreadyClaimed",
            "This reward has already been claimed.",
        ),
        Some(bits) => {
            *bits |= 4;
            envelope(payload).into_response()
        }
        None => platform_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            7,
            "ParameterParseFailure",
            "Unable to parse your parameters.",
        ),
    }
}

async fn memberships(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.write().await;
    record_session_headers(&mut state, &headers);

    envelope(json!({
        "destinyMemberships": [
            {
                "membershipId": "4611686018400000009",
                "membershipType": 1,
                "crossSaveOverride": MEMBERSHIP_TYPE,
                "displayName": "xbox-guardian"
            },
            {
                "membershipId": MEMBERSHIP_ID,
                "membershipType": MEMBERSHIP_TYPE,
                "crossSaveOverride": MEMBERSHIP_TYPE,
                "displayName": "steam-guardian",
                "bungieGlobalDisplayName": "Guardian",
                "bungieGlobalDisplayNameCode": 42
            }
        ],
        "bungieNetUser": {"membershipId": "12345"}
    }))
    .into_response()
}
