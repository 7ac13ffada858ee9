// ==========================================
// 选课分班系统 - 录取引擎
// ==========================================
// 红线: 一次录取/志愿提交是一个不可分割的步骤
// 红线: 校验全部通过后才写入, 被拒绝的请求不修改任何状态
// 红线: 拒绝原因作为 Admission 返回, 不走 Err 通道
// ==========================================
// 职责: 入组、入班、课程录取、志愿提交、重置
// 输入: School 对象图
// 输出: Admission / ProposalResult
// ==========================================

mod core;
mod ops;


pub use self::core::AdmissionCore;
